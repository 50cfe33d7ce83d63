// Tests for handle lifecycle: close, reset, library selection, threading
use crate::*;

#[test]
fn test_double_close_is_noop() {
    let mut state = LuaState::new().unwrap();
    state.parse_line("return 1").unwrap();
    state.close();
    assert!(state.is_closed());
    state.close();
    assert!(state.is_closed());
}

#[test]
fn test_operations_on_closed_handle() {
    let mut state = LuaState::new().unwrap();
    state.close();

    let err = state.parse_line("return 1").unwrap_err();
    assert_eq!(err, LuaError::Closed);
    assert_eq!(err.code(), -1);
    assert_eq!(state.register_function("f", |_| Ok(0)).unwrap_err(), LuaError::Closed);

    // Stack accessors are inert rather than undefined
    assert_eq!(state.get_top(), 0);
    assert_eq!(state.get_type(1), LuaType::None);
    state.push_integer(1);
    assert_eq!(state.get_top(), 0);
    assert_eq!(state.get_string(1).unwrap_err(), LuaError::Closed);
}

#[test]
fn test_reset_revives_closed_handle() {
    let mut state = LuaState::new().unwrap();
    state.close();
    state.reset().unwrap();
    assert!(!state.is_closed());
    state.parse_line("return 1").unwrap();
}

#[test]
fn test_with_libs_subset() {
    let mut state = LuaState::with_libs(&[Stdlib::Basic, Stdlib::Math]).unwrap();
    state.parse_line("assert(math.sqrt(9) == 3)").unwrap();
    state
        .parse_line("assert(io == nil and os == nil and string == nil)")
        .unwrap();
}

#[test]
fn test_reset_keeps_library_selection() {
    let mut state = LuaState::with_libs(&[Stdlib::Basic]).unwrap();
    state.reset().unwrap();
    state.parse_line("assert(math == nil)").unwrap();
}

#[test]
fn test_independent_handles_on_threads() {
    let writer = std::thread::spawn(|| {
        let mut state = LuaState::new().unwrap();
        for i in 0..50 {
            state.parse_line(&format!("x = {i}")).unwrap();
        }
        state.get_global("x");
        assert_eq!(state.get_integer(-1), 49);
        assert_eq!(state.last_error(), "");
    });
    let failer = std::thread::spawn(|| {
        let mut state = LuaState::new().unwrap();
        for _ in 0..50 {
            state.parse_line("oops(").unwrap_err();
            assert!(!state.last_error().is_empty());
        }
        state.parse_line("y = 'fine'").unwrap();
        assert_eq!(state.last_error(), "");
    });
    writer.join().unwrap();
    failer.join().unwrap();
}
