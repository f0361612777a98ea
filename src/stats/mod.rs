// Statistical primitives shared by the aggregation, inference and
// regression stages.
//
// - descriptive: mean, Bessel-corrected standard deviation, median
// - distribution: Student's t tail probabilities via the regularized
//   incomplete beta function
//
// All computations are in f64. Undefined statistics are errors, never
// silent zeros.

mod descriptive;
mod distribution;

pub use descriptive::{is_constant, mean, median, sample_sd, SampleSummary};
pub use distribution::{ln_gamma, regularized_incomplete_beta, student_t_two_sided_p};
