/// Declares a test element type with a per-type live-instance counter,
/// used to verify construct/destruct pairing across relocations.
///
/// Relocation is a bitwise move, so a correct implementation leaves the
/// counter unchanged; a double drop underflows it and an elided drop leaves
/// it non-zero after teardown.
#[cfg(test)]
macro_rules! tracked_type {
    ($name: ident, $counter: ident) => {
        static $counter: ::std::sync::atomic::AtomicUsize =
            ::std::sync::atomic::AtomicUsize::new(0);

        #[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
        struct $name(u64);

        impl $name {
            fn with_value(value: u64) -> $name {
                $counter.fetch_add(1, ::std::sync::atomic::Ordering::SeqCst);
                $name(value)
            }

            fn live() -> usize {
                $counter.load(::std::sync::atomic::Ordering::SeqCst)
            }

            #[allow(unused)]
            fn value(&self) -> u64 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> $name {
                $name::with_value(0)
            }
        }

        impl Clone for $name {
            fn clone(&self) -> $name {
                $name::with_value(self.0)
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                $counter.fetch_sub(1, ::std::sync::atomic::Ordering::SeqCst);
            }
        }
    };
}
