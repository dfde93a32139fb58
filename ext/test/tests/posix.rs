//! End-to-end tests through the POSIX-style mock bodies.

use std::cell::Cell;

use mockarena_test::prelude::*;

/// Copy the stored bytes into the caller's buffer, returning the count.
fn fill<'v>(buf: Value<'v>, data: Value<'v>) -> Value<'v> {
    match (buf.get::<&[Cell<u8>]>(), data.get::<&[u8]>()) {
        (Ok(buf), Ok(data)) => {
            let n = buf.len().min(data.len());
            for (cell, &byte) in buf.iter().zip(data) {
                cell.set(byte);
            }
            Value::from(n as i64)
        }
        _ => Value::from(-1_i64),
    }
}

#[test]
fn scenario_hit_then_miss() {
    let mut mocks = recording(DEFAULT_ARENA_BUDGET);
    mocks.configure(
        "f",
        &[Matcher::eq(10_i32), Matcher::any()],
        &[Responder::returns(99_i32)],
    );

    let x = Value::from(1.5_f64);
    assert_eq!(mocks.dispatch("f", TypeTag::INT, &[Value::from(10_i32), x]), Value::from(99_i32));
    assert_no_error(&mocks);

    assert!(mocks.dispatch("f", TypeTag::INT, &[Value::from(11_i32), x]).is_void());
    assert_last_error(&mocks, ErrorKind::NoMappingMatched);
    assert_eq!(mocks.last_error_message(), "no mappings matched for call: f (2)");
}

#[test]
fn read_fills_the_buffer_then_signals_eof() {
    let mut mocks = recording(DEFAULT_ARENA_BUDGET);
    let fd3 = [Matcher::eq(3_i32), Matcher::any_of(TypeTag::mut_of(Kind::Char))];
    mocks.configure("read", &fd3, &[Responder::param_unchecked(2, fill, b"hello".as_slice())]);
    mocks.configure("read", &fd3, &[Responder::returns(0_i64)]);

    let buf: Vec<Cell<u8>> = (0..8).map(|_| Cell::new(0)).collect();
    assert_eq!(posix::read(&mut mocks, 3, &buf), 5);
    let bytes: Vec<u8> = buf.iter().map(Cell::get).collect();
    assert_eq!(&bytes[..5], b"hello");

    assert_eq!(posix::read(&mut mocks, 3, &buf), 0);
    assert_eq!(posix::read(&mut mocks, 3, &buf), 5);
    assert_no_error(&mocks);

    assert_eq!(posix::read(&mut mocks, 4, &buf), 0);
    assert_last_error(&mocks, ErrorKind::NoMappingMatched);
}

#[test]
fn open_by_path_then_write_and_close() {
    let writes = Cell::new(0_i64);
    let mut mocks = recording(DEFAULT_ARENA_BUDGET);
    mocks.configure(
        "open",
        &[Matcher::substr("/tmp/"), Matcher::any()],
        &[Responder::returns(5_i32)],
    );
    mocks.configure(
        "write",
        &[Matcher::eq(5_i32), Matcher::any()],
        &[Responder::count(&writes), Responder::returns(4_i64)],
    );
    mocks.configure("close", &[Matcher::eq(5_i32)], &[Responder::returns(0_i32)]);

    let fd = posix::open(&mut mocks, "/tmp/scratch", 0);
    assert_eq!(fd, 5);
    assert_eq!(posix::write(&mut mocks, fd, b"data"), 4);
    assert_eq!(posix::write(&mut mocks, fd, b"more"), 4);
    assert_eq!(posix::close(&mut mocks, fd), 0);
    assert_eq!(writes.get(), 2);
    assert_no_error(&mocks);

    assert_eq!(posix::open(&mut mocks, "/var/log/app", 0), 0);
    assert_last_error(&mocks, ErrorKind::NoMappingMatched);
}

#[test]
fn wrong_return_type_is_reported_but_returned() {
    let mut mocks = recording(DEFAULT_ARENA_BUDGET);
    mocks.configure("close", &[Matcher::any()], &[Responder::returns(7_i64)]);

    // The body asks for an int; the configured answer is a long.
    assert_eq!(posix::close(&mut mocks, 1), 0);
    assert_last_error(&mocks, ErrorKind::UnexpectedReturnType);
    assert_eq!(
        mocks.last_error_message(),
        "unexpected return type: close: (long)<>(int)"
    );
}

#[test]
fn typed_wildcard_rejects_other_types() {
    let mut mocks = recording(DEFAULT_ARENA_BUDGET);
    mocks.configure("close", &[Matcher::any_of(TypeTag::UINT)], &[Responder::returns(0_i32)]);
    posix::close(&mut mocks, 1);
    assert_last_error(&mocks, ErrorKind::UnexpectedParameterType);
    assert_eq!(
        mocks.last_error_message(),
        "unexpected parameter type: close (1): (int)<>(unsigned int)"
    );
}
