pub mod historical;
