use std::ops::{Deref, DerefMut};
use std::os::raw::{c_char, c_int, c_void};
use std::panic::{self, AssertUnwindSafe};

use mlua_sys as ffi;
use tracing::{debug, trace};

use crate::error::{LuaError, LuaResult};
use crate::stack::{NativeFunction, Stack, cstr_bytes, to_cstring};
use crate::stdlib::Stdlib;

/// Owning handle over one embedded interpreter instance.
///
/// The handle exclusively owns its native state: it is created with the
/// selected standard libraries open, released by [`LuaState::close`] (or on
/// drop), and recreated from scratch by [`LuaState::reset`]. The underlying
/// pointer is either valid or null (post-close); nothing but construction
/// and `reset` brings a closed handle back.
///
/// Stack accessors are reachable directly on the handle through deref:
/// `state.push_integer(42)`, `state.get_top()`, and so on.
pub struct LuaState {
    stack: Stack,
    libs: Vec<Stdlib>,
    last_error: String,
}

// A handle owns its interpreter exclusively and shares nothing with other
// handles, so moving it to another thread is sound. Concurrent use of a
// single handle is not; `LuaState` stays !Sync.
unsafe impl Send for LuaState {}

impl LuaState {
    /// Create a state with the full standard library open.
    pub fn new() -> LuaResult<LuaState> {
        LuaState::with_libs(&[Stdlib::All])
    }

    /// Create a state with only the named libraries open.
    pub fn with_libs(libs: &[Stdlib]) -> LuaResult<LuaState> {
        let raw = open_state(libs)?;
        trace!(?libs, "created interpreter state");
        Ok(LuaState {
            stack: Stack::from_raw(raw),
            libs: libs.to_vec(),
            last_error: String::new(),
        })
    }

    pub fn is_closed(&self) -> bool {
        !self.stack.is_live()
    }

    /// Release the native interpreter. Calling this more than once is a
    /// no-op.
    pub fn close(&mut self) {
        if self.stack.is_live() {
            unsafe { ffi::lua_close(self.stack.raw()) };
            self.stack.invalidate();
            trace!("closed interpreter state");
        }
    }

    /// Tear down and recreate the interpreter in one step. Every global and
    /// loaded chunk is discarded; the library selection given at
    /// construction is reopened.
    pub fn reset(&mut self) -> LuaResult<()> {
        self.close();
        let raw = open_state(&self.libs)?;
        self.stack = Stack::from_raw(raw);
        self.last_error.clear();
        trace!("reset interpreter state");
        Ok(())
    }

    /// Compile `source` as a chunk named "line" and run it with no
    /// arguments and no expected results. On compile failure the chunk is
    /// never run.
    pub fn parse_line(&mut self, source: &str) -> LuaResult<()> {
        let raw = self.live()?;
        self.last_error.clear();
        debug!(len = source.len(), "parse_line");
        let source = cstr_bytes(source);
        let status = unsafe {
            ffi::luaL_loadbufferx(
                raw,
                source.as_ptr() as *const c_char,
                source.len(),
                c"line".as_ptr(),
                std::ptr::null(),
            )
        };
        if status != ffi::LUA_OK {
            return Err(self.record_error(status));
        }
        let status = unsafe { ffi::lua_pcallk(raw, 0, 0, 0, 0, None) };
        self.finish(status)
    }

    /// Load and run the named file, accepting any number of top-level
    /// results. Extra results stay on the stack for the caller to discard.
    pub fn parse_file(&mut self, path: &str) -> LuaResult<()> {
        let raw = self.live()?;
        self.last_error.clear();
        debug!(path, "parse_file");
        let cpath = to_cstring(path);
        let status = unsafe { ffi::luaL_loadfilex(raw, cpath.as_ptr(), std::ptr::null()) };
        if status != ffi::LUA_OK {
            return Err(self.record_error(status));
        }
        let status = unsafe { ffi::lua_pcallk(raw, 0, ffi::LUA_MULTRET, 0, 0, None) };
        self.finish(status)
    }

    /// Protected call of the function sitting below `nargs` arguments on
    /// the stack. Results replace the function and its arguments.
    pub fn call(&mut self, nargs: i32, nresults: i32) -> LuaResult<()> {
        let raw = self.live()?;
        self.last_error.clear();
        let status = unsafe { ffi::lua_pcallk(raw, nargs, nresults, 0, 0, None) };
        self.finish(status)
    }

    /// Message recorded by the most recent parse/call operation; empty when
    /// it succeeded.
    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    /// Bind `func` under a global name, callable from Lua code with the
    /// stack calling convention.
    pub fn register_function(&mut self, name: &str, func: NativeFunction) -> LuaResult<()> {
        let raw = self.live()?;
        debug!(name, "register native function");
        let cname = to_cstring(name);
        unsafe {
            ffi::lua_pushlightuserdata(raw, func as usize as *mut c_void);
            ffi::lua_pushcclosure(raw, native_trampoline, 1);
            ffi::lua_setglobal(raw, cname.as_ptr());
        }
        Ok(())
    }

    fn live(&self) -> LuaResult<*mut ffi::lua_State> {
        if self.stack.is_live() {
            Ok(self.stack.raw())
        } else {
            Err(LuaError::Closed)
        }
    }

    fn finish(&mut self, status: c_int) -> LuaResult<()> {
        if status == ffi::LUA_OK {
            Ok(())
        } else {
            Err(self.record_error(status))
        }
    }

    // The interpreter leaves its diagnostic on top of the stack; producing
    // the record pops it (error paths shrink the stack by one).
    fn record_error(&mut self, status: c_int) -> LuaError {
        let message = self.stack.get_string_or(-1, "(no error message)");
        self.stack.pop(1);
        let err = LuaError::from_status(status, message);
        self.last_error = err.to_string();
        debug!(code = status, error = %self.last_error, "chunk failed");
        err
    }
}

impl Deref for LuaState {
    type Target = Stack;

    fn deref(&self) -> &Stack {
        &self.stack
    }
}

impl DerefMut for LuaState {
    fn deref_mut(&mut self) -> &mut Stack {
        &mut self.stack
    }
}

impl Drop for LuaState {
    fn drop(&mut self) {
        self.close();
    }
}

fn open_state(libs: &[Stdlib]) -> LuaResult<*mut ffi::lua_State> {
    let raw = unsafe { ffi::luaL_newstate() };
    if raw.is_null() {
        return Err(LuaError::StateAlloc);
    }
    if libs.contains(&Stdlib::All) {
        unsafe { ffi::luaL_openlibs(raw) };
    } else {
        for lib in libs {
            lib.open(raw);
        }
    }
    Ok(raw)
}

const fn upvalue_index(i: c_int) -> c_int {
    ffi::LUA_REGISTRYINDEX - i
}

unsafe extern "C-unwind" fn native_trampoline(raw: *mut ffi::lua_State) -> c_int {
    let func: NativeFunction = unsafe {
        let ptr = ffi::lua_touserdata(raw, upvalue_index(1));
        std::mem::transmute::<*mut c_void, NativeFunction>(ptr)
    };
    let mut stack = Stack::from_raw(raw);
    let message = match panic::catch_unwind(AssertUnwindSafe(|| func(&mut stack))) {
        Ok(Ok(nresults)) => return nresults,
        Ok(Err(err)) => err.to_string(),
        Err(_) => String::from("native function panicked"),
    };
    // Copy the message into interpreter-owned memory and release the Rust
    // allocation before raising: lua_error longjmps past this frame and
    // would skip the destructor.
    unsafe {
        ffi::lua_pushlstring(raw, message.as_ptr() as *const c_char, message.len());
        drop(message);
        ffi::lua_error(raw)
    }
}
