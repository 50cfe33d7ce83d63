// Tests for the stack marshaling accessors
use crate::*;

#[test]
fn test_type_tags_match_c_constants() {
    assert_eq!(LuaType::None as i32, -1);
    assert_eq!(LuaType::Nil as i32, 0);
    assert_eq!(LuaType::Boolean as i32, 1);
    assert_eq!(LuaType::LightUserdata as i32, 2);
    assert_eq!(LuaType::Number as i32, 3);
    assert_eq!(LuaType::String as i32, 4);
    assert_eq!(LuaType::Table as i32, 5);
    assert_eq!(LuaType::Function as i32, 6);
    assert_eq!(LuaType::Userdata as i32, 7);
    assert_eq!(LuaType::Thread as i32, 8);
}

#[test]
fn test_push_and_inspect_types() {
    let mut state = LuaState::new().unwrap();
    state.push_nil();
    state.push_boolean(true);
    state.push_number(3.25);
    state.push_string("hello");

    assert_eq!(state.get_top(), 4);
    assert_eq!(state.get_type(1), LuaType::Nil);
    assert_eq!(state.get_type(2), LuaType::Boolean);
    assert_eq!(state.get_type(3), LuaType::Number);
    assert_eq!(state.get_type(4), LuaType::String);
    assert_eq!(state.get_type(-1), LuaType::String);
}

#[test]
fn test_get_type_out_of_range() {
    let mut state = LuaState::new().unwrap();
    assert_eq!(state.get_type(1), LuaType::None);
    state.push_nil();
    assert_eq!(state.get_type(99), LuaType::None);
    assert_eq!(state.get_type(-99), LuaType::None);
    assert_eq!(state.get_type(0), LuaType::None);
    assert_eq!(state.get_type(i32::MIN), LuaType::None);
}

#[test]
fn test_getters_out_of_range() {
    let mut state = LuaState::new().unwrap();
    state.push_nil();

    assert_eq!(state.get_number(99), 0.0);
    assert_eq!(state.get_number_or(99, 7.5), 7.5);
    assert_eq!(state.get_integer(99), 0);
    assert_eq!(state.get_integer_or(99, 9), 9);
    assert!(!state.get_boolean(99));
    assert!(state.get_boolean_or(99, true));
    assert!(state.get_string(99).is_err());
    assert_eq!(state.get_string_or(99, "fallback"), "fallback");
    assert_eq!(state.get_string_or(-99, "fallback"), "fallback");

    // The slot that does exist is untouched by the misses
    assert_eq!(state.get_top(), 1);
    assert_eq!(state.get_type(1), LuaType::Nil);
}

#[test]
fn test_type_names() {
    assert_eq!(LuaType::None.name(), "no value");
    assert_eq!(LuaType::Nil.name(), "nil");
    assert_eq!(LuaType::Boolean.name(), "boolean");
    assert_eq!(LuaType::Number.name(), "number");
    assert_eq!(LuaType::String.name(), "string");
    assert_eq!(LuaType::Table.name(), "table");
    assert_eq!(LuaType::Function.name(), "function");

    let mut state = LuaState::new().unwrap();
    state.push_integer(1);
    assert_eq!(state.get_type(-1).name(), "number");
}

#[test]
fn test_number_accessors() {
    let mut state = LuaState::new().unwrap();
    state.push_number(3.25);
    assert_eq!(state.get_number(-1), 3.25);
    assert_eq!(state.get_number_or(-1, 7.5), 3.25);

    state.push_string("not a number");
    assert_eq!(state.get_number(-1), 0.0);
    assert_eq!(state.get_number_or(-1, 7.5), 7.5);
}

#[test]
fn test_integer_accessors() {
    let mut state = LuaState::new().unwrap();
    state.push_integer(42);
    assert_eq!(state.get_integer(-1), 42);
    assert_eq!(state.get_integer_or(-1, 9), 42);

    state.push_boolean(false);
    assert_eq!(state.get_integer(-1), 0);
    assert_eq!(state.get_integer_or(-1, 9), 9);
}

#[test]
fn test_boolean_accessors() {
    let mut state = LuaState::new().unwrap();
    state.push_boolean(true);
    assert!(state.get_boolean(-1));

    // Only nil and false are falsy under native coercion
    state.push_integer(0);
    assert!(state.get_boolean(-1));
    state.push_nil();
    assert!(!state.get_boolean(-1));

    // The defaulted form requires an actual boolean slot
    state.push_integer(1);
    assert!(!state.get_boolean_or(-1, false));
    assert!(state.get_boolean_or(-1, true));
}

#[test]
fn test_string_coercion_policy() {
    let mut state = LuaState::new().unwrap();

    // Strings and numbers convert
    state.push_string("plain");
    assert_eq!(state.get_string(-1).unwrap(), "plain");
    state.push_integer(42);
    assert_eq!(state.get_string(-1).unwrap(), "42");

    // Anything else errors without a default, falls back with one
    state.push_boolean(true);
    assert!(state.get_string(-1).is_err());
    assert_eq!(state.get_string_or(-1, "fallback"), "fallback");
}

#[test]
fn test_pop_clamps_to_depth() {
    let mut state = LuaState::new().unwrap();
    state.push_nil();
    state.push_nil();
    state.push_nil();
    state.pop(2);
    assert_eq!(state.get_top(), 1);
    state.pop(10);
    assert_eq!(state.get_top(), 0);
}

#[test]
fn test_embedded_null_truncates() {
    let mut state = LuaState::new().unwrap();
    state.push_string("ab\0cd");
    assert_eq!(state.get_string(-1).unwrap(), "ab");
}
