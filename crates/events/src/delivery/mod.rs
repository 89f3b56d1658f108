//! External delivery channels for door notifications.

pub mod email;
