pub mod connection_table;
pub mod fd;
pub mod io;
pub mod socket;
