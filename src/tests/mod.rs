pub mod test_utils;

mod test_round_trip;

#[cfg(feature = "allow_filesystem")]
mod test_from_yaml;
