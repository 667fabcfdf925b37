pub mod board_models;
pub mod board_handlers;
pub mod board_service;

pub use board_models::{Board, BoardColumn};
pub use board_handlers::get_board;
pub use board_service::BoardService;
