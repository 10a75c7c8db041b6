//! メッセージ送信（通知）の実装
//!
//! ## 実装
//!
//! - `websocket`: WebSocket 接続ごとの送信キューを管理する実装

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
