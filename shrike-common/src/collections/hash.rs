use fxhash::FxBuildHasher;

pub type Hasher = FxBuildHasher;
