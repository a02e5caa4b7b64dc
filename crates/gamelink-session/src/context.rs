//! The session context: everything the launcher told us about this game.
//!
//! A context is built once, when the embedded document loads, and never
//! changes afterwards. Its validity is decided at construction time so
//! every later check (start, submit) sees the same answer.

use std::borrow::Cow;

use gamelink_protocol::SessionIds;
use url::Url;

use crate::params;
use crate::SessionError;

/// Launch parameters for one embedded game session.
///
/// Every field is optional on the wire. Only `user_id`, `room_id` and
/// `session_token` matter for validity; the rest are informational and
/// are kept as the raw strings the launcher sent (including the
/// numeric-looking ones like `entry_fee`).
///
/// Fields are private so the context stays read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    user_id: Option<String>,
    room_id: Option<String>,
    on_chain_room_id: Option<String>,
    game_id: Option<String>,
    session_token: Option<String>,
    game_name: Option<String>,
    instructions: Option<String>,
    status: Option<String>,
    players: Option<String>,
    currency: Option<String>,
    entry_fee: Option<String>,
    total_prize_pool: Option<String>,
    max_players: Option<String>,
    current_players: Option<String>,
    winner_split_rule: Option<String>,
    valid: bool,
}

impl SessionContext {
    /// Builds a context from a URL query string.
    ///
    /// A leading `?` is ignored and values are percent-decoded. When a key
    /// repeats, the first occurrence wins.
    ///
    /// ```rust
    /// use gamelink_session::SessionContext;
    ///
    /// let ctx = SessionContext::from_query("?user_id=u1&room_id=r1&session_token=t");
    /// assert!(ctx.is_valid());
    /// assert_eq!(ctx.room_id(), Some("r1"));
    /// ```
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    /// Builds a context from the full launch URL.
    ///
    /// # Errors
    /// Returns [`SessionError::MalformedUrl`] if `launch_url` isn't an
    /// absolute URL.
    pub fn from_url(launch_url: &str) -> Result<Self, SessionError> {
        let url = Url::parse(launch_url)?;
        Ok(Self::from_pairs(url.query_pairs()))
    }

    /// Builds a context from already-split key/value pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Cow<'a, str>, Cow<'a, str>)>,
    {
        let mut ctx = Self::default();

        for (key, value) in pairs {
            let Some(slot) = ctx.slot_mut(&key) else {
                continue;
            };
            if slot.is_some() {
                tracing::trace!(key = %key, "ignoring repeated launch parameter");
                continue;
            }
            *slot = Some(value.into_owned());
        }

        ctx.valid = ctx.missing_fields().is_empty();
        ctx
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        let slot = match key {
            params::USER_ID => &mut self.user_id,
            params::ROOM_ID => &mut self.room_id,
            params::ON_CHAIN_ROOM_ID => &mut self.on_chain_room_id,
            params::GAME_ID => &mut self.game_id,
            params::SESSION_TOKEN => &mut self.session_token,
            params::GAME_NAME => &mut self.game_name,
            params::INSTRUCTIONS => &mut self.instructions,
            params::STATUS => &mut self.status,
            params::PLAYERS => &mut self.players,
            params::CURRENCY => &mut self.currency,
            params::ENTRY_FEE => &mut self.entry_fee,
            params::TOTAL_PRIZE_POOL => &mut self.total_prize_pool,
            params::MAX_PLAYERS => &mut self.max_players,
            params::CURRENT_PLAYERS => &mut self.current_players,
            params::WINNER_SPLIT_RULE => &mut self.winner_split_rule,
            _ => return None,
        };
        Some(slot)
    }

    /// `true` iff `user_id`, `room_id` and `session_token` are all present
    /// and non-empty.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Names of the required parameters that are missing or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let required = [
            (params::USER_ID, &self.user_id),
            (params::ROOM_ID, &self.room_id),
            (params::SESSION_TOKEN, &self.session_token),
        ];
        required
            .into_iter()
            .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
            .map(|(name, _)| name)
            .collect()
    }

    /// Same check as [`is_valid`](Self::is_valid), as a `Result`.
    ///
    /// # Errors
    /// Returns [`SessionError::Invalid`] naming the missing parameters.
    pub fn require_valid(&self) -> Result<(), SessionError> {
        if self.valid {
            Ok(())
        } else {
            Err(SessionError::Invalid {
                missing: self.missing_fields(),
            })
        }
    }

    /// The identifiers echoed to the host on every outbound message.
    pub fn ids(&self) -> SessionIds {
        SessionIds {
            user_id: self.user_id.clone(),
            room_id: self.room_id.clone(),
            on_chain_room_id: self.on_chain_room_id.clone(),
            game_id: self.game_id.clone(),
            session_token: self.session_token.clone(),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn on_chain_room_id(&self) -> Option<&str> {
        self.on_chain_room_id.as_deref()
    }

    pub fn game_id(&self) -> Option<&str> {
        self.game_id.as_deref()
    }

    /// The opaque session token. Never log this.
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    pub fn game_name(&self) -> Option<&str> {
        self.game_name.as_deref()
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn players(&self) -> Option<&str> {
        self.players.as_deref()
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn entry_fee(&self) -> Option<&str> {
        self.entry_fee.as_deref()
    }

    pub fn total_prize_pool(&self) -> Option<&str> {
        self.total_prize_pool.as_deref()
    }

    pub fn max_players(&self) -> Option<&str> {
        self.max_players.as_deref()
    }

    pub fn current_players(&self) -> Option<&str> {
        self.current_players.as_deref()
    }

    pub fn winner_split_rule(&self) -> Option<&str> {
        self.winner_split_rule.as_deref()
    }
}
