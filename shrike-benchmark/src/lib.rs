// benchmark-only crate, see benches/
