#[macro_export]
macro_rules! hashmap {
    () => {{
        use $crate::collections::HashMap;

        HashMap::new()
    }};

    ( $($key:expr => $value:expr),+ $(,)* ) => {{
        use $crate::collections::HashMap;

        let capacity = count!($($value),+);

        let mut hash = HashMap::with_capacity(capacity);
        $(
            hash.insert($key, $value);
        )*

        hash
    }};
}

#[macro_export]
macro_rules! count {
    ($cur: tt $(, $tail: tt)* $(,)*) => {
        1 + count!($($tail,)*)
    };

    () => { 0 };
}
