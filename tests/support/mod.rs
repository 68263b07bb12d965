pub mod socket_guard;
pub mod truncated_server;
