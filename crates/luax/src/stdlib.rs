use std::os::raw::c_char;

use mlua_sys as ffi;

/// Standard library selection for a new interpreter state.
///
/// `All` opens everything at once; any other combination opens exactly the
/// named libraries and nothing else, which is the usual shape for sandboxed
/// embedding hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stdlib {
    Basic,
    Coroutine,
    Package,
    String,
    Table,
    Math,
    Io,
    Os,
    Utf8,
    Debug,

    All,
}

impl Stdlib {
    pub(crate) fn open(self, raw: *mut ffi::lua_State) {
        let (name, opener): (*const c_char, ffi::lua_CFunction) = match self {
            Stdlib::Basic => (c"_G".as_ptr(), ffi::luaopen_base),
            Stdlib::Coroutine => (c"coroutine".as_ptr(), ffi::luaopen_coroutine),
            Stdlib::Package => (c"package".as_ptr(), ffi::luaopen_package),
            Stdlib::String => (c"string".as_ptr(), ffi::luaopen_string),
            Stdlib::Table => (c"table".as_ptr(), ffi::luaopen_table),
            Stdlib::Math => (c"math".as_ptr(), ffi::luaopen_math),
            Stdlib::Io => (c"io".as_ptr(), ffi::luaopen_io),
            Stdlib::Os => (c"os".as_ptr(), ffi::luaopen_os),
            Stdlib::Utf8 => (c"utf8".as_ptr(), ffi::luaopen_utf8),
            Stdlib::Debug => (c"debug".as_ptr(), ffi::luaopen_debug),
            Stdlib::All => {
                unsafe { ffi::luaL_openlibs(raw) };
                return;
            }
        };
        unsafe {
            ffi::luaL_requiref(raw, name, opener, 1);
            // requiref leaves the module table on the stack
            ffi::lua_settop(raw, -2);
        }
    }
}
