//! Backend dispatch macro.
//!
//! Generates the match over [`SqlxConnection`](crate::db::SqlxConnection) variants so
//! each session operation reads as one line per backend.

/// Macro for generating session dispatch match arms.
///
/// # Example
///
/// ```ignore
/// impl_session_dispatch!(&mut self.conn, {
///     MySql(c) => c.ping().await,
///     Postgres(c) => c.ping().await,
///     SQLite(c) => c.ping().await,
/// });
/// ```
#[macro_export]
macro_rules! impl_session_dispatch {
    ($session:expr, { $($variant:ident($c:ident) => $body:expr),+ $(,)? }) => {
        match $session {
            $(
                $crate::db::sqlx_store::SqlxConnection::$variant($c) => $body,
            )+
        }
    };
}

pub use impl_session_dispatch;
