use std::os::raw::c_int;

use mlua_sys as ffi;

pub type LuaResult<T> = Result<T, LuaError>;

/// Failure record for chunk loading, protected calls and stack access.
///
/// The first five variants correspond one-to-one to the interpreter's own
/// status categories and carry its diagnostic text; [`LuaError::code`]
/// returns the matching numeric constant so existing status-code callers
/// keep working.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LuaError {
    #[error("error(runtime error) {0}")]
    Runtime(String),
    #[error("error(syntax error during pre-compilation) {0}")]
    Syntax(String),
    #[error("error(memory allocation error) {0}")]
    Memory(String),
    #[error("error(error while running the error handler function) {0}")]
    Handler(String),
    #[error("error(thread has been suspended) {0}")]
    Yield(String),
    #[error("error(unknown) [{code}] {message}")]
    Unknown { code: i32, message: String },
    /// Operation attempted on a handle whose native state was closed.
    #[error("interpreter state has been closed")]
    Closed,
    /// Native allocation failed while creating an interpreter state.
    #[error("not enough memory to create an interpreter state")]
    StateAlloc,
}

impl LuaError {
    pub(crate) fn from_status(code: c_int, message: String) -> LuaError {
        match code {
            ffi::LUA_ERRRUN => LuaError::Runtime(message),
            ffi::LUA_ERRSYNTAX => LuaError::Syntax(message),
            ffi::LUA_ERRMEM => LuaError::Memory(message),
            ffi::LUA_ERRERR => LuaError::Handler(message),
            ffi::LUA_YIELD => LuaError::Yield(message),
            _ => LuaError::Unknown { code, message },
        }
    }

    /// Numeric status code, identical to the interpreter's own constants
    /// (0 ok, 1 yield, 2 runtime, 3 syntax, 4 memory, 5 handler).
    /// `Closed` reports -1, the value reserved for a null state.
    pub fn code(&self) -> i32 {
        match self {
            LuaError::Runtime(_) => ffi::LUA_ERRRUN,
            LuaError::Syntax(_) => ffi::LUA_ERRSYNTAX,
            LuaError::Memory(_) | LuaError::StateAlloc => ffi::LUA_ERRMEM,
            LuaError::Handler(_) => ffi::LUA_ERRERR,
            LuaError::Yield(_) => ffi::LUA_YIELD,
            LuaError::Unknown { code, .. } => *code,
            LuaError::Closed => -1,
        }
    }
}
