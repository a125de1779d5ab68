use crate::all::*;

lazy_static! {
  pub static ref PARAMETER_SET: Mutex<ParameterSet> = Mutex::new(ParameterSet::default());
}

#[derive(Clone, Debug)]
#[derive(clap::Parser)]
pub struct ParameterSet {
  // Defaults for newly created tracks.
  #[clap(long, default_value = "21")]
  pub default_pattern_size: usize,
  #[clap(long, default_value = "71")]
  pub default_search_size: usize,
  #[clap(long, default_value = "0.75")]
  pub default_minimum_correlation: f64,
  #[clap(long, default_value = "1.0")]
  pub default_weight: f64,

  // Dopesheet coverage, in number of tracks with an enabled marker on a frame.
  #[clap(long, default_value = "8")]
  pub coverage_acceptable: usize,
  #[clap(long, default_value = "16")]
  pub coverage_good: usize,

  // Minimum number of edge samples handled by one worker in the distortion bounds scan.
  #[clap(long, default_value = "32")]
  pub bounds_chunk_size: usize,
}

// Not derived, `clap` default values are the single source of truth.
impl Default for ParameterSet {
  fn default() -> ParameterSet {
    use clap::Parser;
    ParameterSet::parse_from(["cliptrack"])
  }
}

pub fn parameters() -> ParameterSet {
  PARAMETER_SET.lock().map(|p| p.clone()).unwrap_or_else(|poisoned| poisoned.into_inner().clone())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let p = ParameterSet::default();
    assert_eq!(p.default_pattern_size, 21);
    assert_eq!(p.default_search_size, 71);
    assert_eq!(p.coverage_acceptable, 8);
    assert_eq!(p.coverage_good, 16);
    assert!((p.default_minimum_correlation - 0.75).abs() < 1e-12);
  }
}
