use std::ffi::CString;
use std::os::raw::{c_char, c_int};

use mlua_sys as ffi;

use crate::error::{LuaError, LuaResult};
use crate::ltype::LuaType;

/// Signature for host functions callable from Lua code.
///
/// The function reads its arguments from the stack (argument 1 at index 1),
/// pushes its results, and returns how many results it pushed. Returning
/// `Err` raises an interpreter error that unwinds to the nearest protected
/// call boundary, where it surfaces as a runtime error record.
pub type NativeFunction = fn(&mut Stack) -> LuaResult<i32>;

/// View of one interpreter value stack.
///
/// Indices are 1-based from the bottom; negative indices count from the top
/// (-1 is the topmost slot). All accessors are inert once the owning handle
/// has been closed: reads report "no value" defaults and pushes do nothing.
pub struct Stack {
    raw: *mut ffi::lua_State,
}

impl Stack {
    pub(crate) fn from_raw(raw: *mut ffi::lua_State) -> Stack {
        Stack { raw }
    }

    pub(crate) fn raw(&self) -> *mut ffi::lua_State {
        self.raw
    }

    pub(crate) fn invalidate(&mut self) {
        self.raw = std::ptr::null_mut();
    }

    pub(crate) fn is_live(&self) -> bool {
        !self.raw.is_null()
    }

    /// Type tag at `index`; `LuaType::None` when the index is out of range.
    pub fn get_type(&self, index: i32) -> LuaType {
        if !self.in_range(index) {
            return LuaType::None;
        }
        LuaType::from_code(unsafe { ffi::lua_type(self.raw, index) })
    }

    /// Current stack depth.
    pub fn get_top(&self) -> i32 {
        if !self.is_live() {
            return 0;
        }
        unsafe { ffi::lua_gettop(self.raw) }
    }

    /// Discard the `count` topmost slots (clamped to the current depth).
    pub fn pop(&mut self, count: i32) {
        if !self.is_live() || count <= 0 {
            return;
        }
        let top = self.get_top();
        unsafe { ffi::lua_settop(self.raw, top - count.min(top)) };
    }

    /// Native number coercion; non-coercible slots yield 0.0.
    pub fn get_number(&self, index: i32) -> f64 {
        if !self.in_range(index) {
            return 0.0;
        }
        unsafe { ffi::lua_tonumberx(self.raw, index, std::ptr::null_mut()) }
    }

    pub fn get_number_or(&self, index: i32, default: f64) -> f64 {
        if self.in_range(index) && unsafe { ffi::lua_isnumber(self.raw, index) } != 0 {
            self.get_number(index)
        } else {
            default
        }
    }

    /// Native integer coercion; non-coercible slots yield 0.
    pub fn get_integer(&self, index: i32) -> i64 {
        if !self.in_range(index) {
            return 0;
        }
        unsafe { ffi::lua_tointegerx(self.raw, index, std::ptr::null_mut()) }
    }

    pub fn get_integer_or(&self, index: i32, default: i64) -> i64 {
        if self.in_range(index) && unsafe { ffi::lua_isnumber(self.raw, index) } != 0 {
            self.get_integer(index)
        } else {
            default
        }
    }

    /// `false` for nil and false, `true` for every other value.
    pub fn get_boolean(&self, index: i32) -> bool {
        self.in_range(index) && unsafe { ffi::lua_toboolean(self.raw, index) } != 0
    }

    pub fn get_boolean_or(&self, index: i32, default: bool) -> bool {
        if self.get_type(index) == LuaType::Boolean {
            self.get_boolean(index)
        } else {
            default
        }
    }

    /// Read the slot as a string. Succeeds for string and number slots (the
    /// interpreter's own coercion rule, applied uniformly); any other type
    /// is an error. Invalid UTF-8 is replaced lossily.
    pub fn get_string(&self, index: i32) -> LuaResult<String> {
        if !self.is_live() {
            return Err(LuaError::Closed);
        }
        match self.get_type(index) {
            LuaType::String | LuaType::Number => {}
            other => {
                return Err(LuaError::Runtime(format!(
                    "cannot read a {} at stack index {} as a string",
                    other.name(),
                    index
                )));
            }
        }
        let mut len = 0usize;
        let ptr = unsafe { ffi::lua_tolstring(self.raw, index, &mut len) };
        if ptr.is_null() {
            return Err(LuaError::Runtime(format!(
                "cannot read stack index {index} as a string"
            )));
        }
        let bytes = unsafe { std::slice::from_raw_parts(ptr as *const u8, len) };
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Like [`Stack::get_string`] but returns `default` instead of erroring.
    pub fn get_string_or(&self, index: i32, default: &str) -> String {
        if self.in_range(index) && unsafe { ffi::lua_isstring(self.raw, index) } != 0 {
            self.get_string(index)
                .unwrap_or_else(|_| default.to_string())
        } else {
            default.to_string()
        }
    }

    pub fn push_number(&mut self, value: f64) {
        if !self.is_live() {
            return;
        }
        self.ensure_slot();
        unsafe { ffi::lua_pushnumber(self.raw, value) };
    }

    pub fn push_integer(&mut self, value: i64) {
        if !self.is_live() {
            return;
        }
        self.ensure_slot();
        unsafe { ffi::lua_pushinteger(self.raw, value) };
    }

    pub fn push_string(&mut self, value: &str) {
        if !self.is_live() {
            return;
        }
        self.ensure_slot();
        let bytes = cstr_bytes(value);
        unsafe { ffi::lua_pushlstring(self.raw, bytes.as_ptr() as *const c_char, bytes.len()) };
    }

    pub fn push_nil(&mut self) {
        if !self.is_live() {
            return;
        }
        self.ensure_slot();
        unsafe { ffi::lua_pushnil(self.raw) };
    }

    pub fn push_boolean(&mut self, value: bool) {
        if !self.is_live() {
            return;
        }
        self.ensure_slot();
        unsafe { ffi::lua_pushboolean(self.raw, value as c_int) };
    }

    /// Push the named global onto the stack (nil if it is not defined).
    pub fn get_global(&mut self, name: &str) {
        if !self.is_live() {
            return;
        }
        self.ensure_slot();
        let name = to_cstring(name);
        unsafe { ffi::lua_getglobal(self.raw, name.as_ptr()) };
    }

    /// Pop the top of the stack into the named global. No-op when the stack
    /// is empty.
    pub fn set_global(&mut self, name: &str) {
        if !self.is_live() || self.get_top() == 0 {
            return;
        }
        let name = to_cstring(name);
        unsafe { ffi::lua_setglobal(self.raw, name.as_ptr()) };
    }

    // The C accessors are only defined for slots inside the current frame;
    // anything past the top counts as "no value" and must never reach them.
    fn in_range(&self, index: i32) -> bool {
        self.is_live() && index != 0 && index.unsigned_abs() <= self.get_top() as u32
    }

    // Growth only fails on native memory exhaustion, which is not a
    // recoverable condition for the embedding host.
    fn ensure_slot(&mut self) {
        if unsafe { ffi::lua_checkstack(self.raw, 1) } == 0 {
            panic!("interpreter stack cannot grow: out of memory");
        }
    }
}

/// C-string semantics at the boundary: text stops at the first null byte.
pub(crate) fn cstr_bytes(s: &str) -> &[u8] {
    let bytes = s.as_bytes();
    match bytes.iter().position(|&b| b == 0) {
        Some(pos) => &bytes[..pos],
        None => bytes,
    }
}

pub(crate) fn to_cstring(s: &str) -> CString {
    // cstr_bytes leaves no interior null, so this cannot fail.
    CString::new(cstr_bytes(s)).unwrap_or_default()
}
