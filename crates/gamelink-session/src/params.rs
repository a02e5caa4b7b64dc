//! Query-string keys the launcher uses.

pub const USER_ID: &str = "user_id";
pub const ROOM_ID: &str = "room_id";
pub const ON_CHAIN_ROOM_ID: &str = "on_chain_room_id";
pub const GAME_ID: &str = "game_id";
pub const SESSION_TOKEN: &str = "session_token";
pub const GAME_NAME: &str = "game_name";
pub const INSTRUCTIONS: &str = "instructions";
pub const STATUS: &str = "status";
pub const PLAYERS: &str = "players";
pub const CURRENCY: &str = "currency";
pub const ENTRY_FEE: &str = "entry_fee";
pub const TOTAL_PRIZE_POOL: &str = "total_prize_pool";
pub const MAX_PLAYERS: &str = "max_players";
pub const CURRENT_PLAYERS: &str = "current_players";
pub const WINNER_SPLIT_RULE: &str = "winner_split_rule";

/// Parameters that must be present and non-empty for a session to be valid.
pub const REQUIRED: [&str; 3] = [USER_ID, ROOM_ID, SESSION_TOKEN];
