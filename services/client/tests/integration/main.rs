
mod auth_test;
mod session_test;
