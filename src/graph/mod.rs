mod connection;

pub use connection::ConnectionGraph;
