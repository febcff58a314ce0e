pub mod bot_service;
pub mod decision;
pub mod message_service;
pub mod session_service;
