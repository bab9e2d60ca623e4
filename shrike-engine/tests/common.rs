extern crate shrike_engine;

use shrike_engine::{Result, ResultExt};

/// A helper that facilitates try (?) operator use within test functions
pub fn wrap_result<F>(cl: F)
where
    F: Fn() -> Result<()>,
{
    cl().with_context(|_| "test execution failed").unwrap()
}

macro_rules! wrap_result {
    ($cl: block) => {
        wrap_result(|| {
            $cl;
            Ok(())
        })
    };
}

#[test]
fn it_wraps_result() {
    // fake use of wrap_result macro
    // to prevent rustc from complaining about unused macro
    wrap_result!({{

    }})
}
