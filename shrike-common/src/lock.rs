/// Lock acquisition helpers mapping lock poisoning into `failure` errors.
///
/// `acquire!(read lock)` / `acquire!(write lock)` yield a plain reference and
/// panic on poisoning (for code paths with no `Result` return), while the
/// `raw` forms yield the guard itself and the `carry` forms propagate the
/// poisoning error with `?`.
#[macro_export]
macro_rules! acquire {
    (read $lock: expr) => {
        & *acquire!(raw read $lock)
    };

    (write $lock: expr) => {
        &mut *acquire!(raw write $lock)
    };

    (raw read $lock: expr) => {
        acquire!(carry read $lock)
            .with_context(|_| "unable to acquire read lock")
            .unwrap()
    };

    (raw write $lock: expr) => {
        acquire!(carry write $lock)
            .with_context(|_| "unable to acquire write lock")
            .unwrap()
    };

    (carry read $lock: expr) => {
        $lock
            .read()
            .map_err(|poison_err| ::failure::err_msg(poison_err.to_string()))
    };

    (carry write $lock: expr) => {
        $lock
            .write()
            .map_err(|poison_err| ::failure::err_msg(poison_err.to_string()))
    };
}

#[macro_export]
macro_rules! locked {
    (rw $val: expr) => {
        RwLock::new($val)
    };
}
