//! Unit tests exercising the session manager and the request gateway
//! against the in-memory store and the mock transport.

mod gateway_test;
