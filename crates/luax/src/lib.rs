// Safe embedding handle over the Lua 5.4 C API
// The native interpreter is compiled in through mlua-sys (vendored)

#[cfg(test)]
mod test;

mod error;
mod ltype;
mod stack;
mod state;
mod stdlib;

pub use error::{LuaError, LuaResult};
pub use ltype::LuaType;
pub use stack::{NativeFunction, Stack};
pub use state::LuaState;
pub use stdlib::Stdlib;
