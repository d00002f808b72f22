use credit_approval_core::PipelineResult;
use credit_approval_data::RawTable;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const MISSING: &str = "?";

/// Rows of the reference credit-approval table.
pub const CREDIT_APPROVAL_ROWS: usize = 690;
/// Approved (`+`) applications in the reference table; the other 383 are denied.
pub const CREDIT_APPROVAL_APPROVED: usize = 307;

const EDUCATION: &[&str] = &[
    "c", "q", "w", "i", "aa", "ff", "k", "cc", "m", "x", "d", "e", "j", "r",
];
const ETHNICITY: &[&str] = &["v", "h", "bb", "ff", "j", "z", "dd", "n", "o"];

fn normal(rng: &mut StdRng) -> f64 {
    // Box-Muller
    let u1: f64 = rng.gen::<f64>().max(1e-10);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// The first `options.len()` rows walk every option so small tables still see each category.
fn pick<'a>(rng: &mut StdRng, options: &[&'a str], row: usize) -> &'a str {
    if row < options.len() {
        options[row]
    } else {
        options[rng.gen_range(0..options.len())]
    }
}

fn flag(rng: &mut StdRng, p_true: f64) -> &'static str {
    if rng.gen_bool(p_true) {
        "t"
    } else {
        "f"
    }
}

/// Replace `cell` with the missing token with probability `p`. Row 0 is always kept.
fn maybe_missing(rng: &mut StdRng, cell: String, p: f64, row: usize) -> String {
    if row > 0 && rng.gen_bool(p) {
        MISSING.to_string()
    } else {
        cell
    }
}

/// Generate a headerless credit-application table in the 16-column credit-approval layout.
///
/// `n_samples * 307 / 690` rows are approved (`+`), the rest denied (`-`), in shuffled order.
/// Approval is driven by PriorDefault, Employed, YearsEmployed and CreditScore; a few
/// categorical cells and the Debt/Income columns carry `?` for missing values.
pub fn make_credit_applications(n_samples: usize, seed: Option<u64>) -> PipelineResult<RawTable> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let n_approved = n_samples * CREDIT_APPROVAL_APPROVED / CREDIT_APPROVAL_ROWS;
    let mut approved: Vec<bool> = (0..n_samples).map(|i| i < n_approved).collect();
    approved.shuffle(&mut rng);

    let mut rows = Vec::with_capacity(n_samples);
    for (i, &ok) in approved.iter().enumerate() {
        let gender = pick(&mut rng, &["a", "b"], i).to_string();
        let age = format!("{:.2}", (31.5 + 11.9 * normal(&mut rng)).clamp(13.75, 80.25));
        let debt = format!("{:.3}", (4.8 + 5.0 * normal(&mut rng)).abs().min(28.0));
        let married = pick(&mut rng, &["u", "y", "l"], i).to_string();
        let bank = match married.as_str() {
            "u" => "g",
            "y" => "p",
            _ => "gg",
        }
        .to_string();
        let education = pick(&mut rng, EDUCATION, i).to_string();
        let ethnicity = pick(&mut rng, ETHNICITY, i).to_string();

        let years_mean = if ok { 3.4 } else { 1.2 };
        let years = format!("{:.3}", (years_mean + 2.5 * normal(&mut rng)).abs().min(28.5));
        let prior_default = flag(&mut rng, if ok { 0.93 } else { 0.2 });
        let employed = flag(&mut rng, if ok { 0.68 } else { 0.22 });
        let max_score = if ok { 20 } else { 8 };
        let credit_score = if employed == "t" {
            rng.gen_range(1..max_score)
        } else {
            0
        };
        let drivers_license = flag(&mut rng, 0.46);
        let citizen = pick(&mut rng, &["g", "s", "p"], i);
        let zip = format!("{:05}", rng.gen_range(0..2000) / 20 * 20);
        let income_scale = if ok { 2000.0 } else { 200.0 };
        let income = format!("{}", (income_scale * normal(&mut rng).abs()).round() as i64);

        rows.push(vec![
            maybe_missing(&mut rng, gender, 0.02, i),
            maybe_missing(&mut rng, age, 0.02, i),
            maybe_missing(&mut rng, debt, 0.01, i),
            maybe_missing(&mut rng, married, 0.01, i),
            maybe_missing(&mut rng, bank, 0.01, i),
            maybe_missing(&mut rng, education, 0.013, i),
            maybe_missing(&mut rng, ethnicity, 0.013, i),
            years,
            prior_default.to_string(),
            employed.to_string(),
            credit_score.to_string(),
            drivers_license.to_string(),
            citizen.to_string(),
            maybe_missing(&mut rng, zip, 0.02, i),
            maybe_missing(&mut rng, income, 0.01, i),
            if ok { "+" } else { "-" }.to_string(),
        ]);
    }

    RawTable::new(rows)
}

/// A seeded stand-in for the reference table: 690 rows, 383 denied and 307 approved.
pub fn credit_approval_like(seed: u64) -> PipelineResult<RawTable> {
    make_credit_applications(CREDIT_APPROVAL_ROWS, Some(seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_approval_like_layout() {
        let raw = credit_approval_like(42).unwrap();
        assert_eq!(raw.n_rows(), 690);
        assert_eq!(raw.width(), 16);

        let denied = raw.rows().iter().filter(|r| r[15] == "-").count();
        let approved = raw.rows().iter().filter(|r| r[15] == "+").count();
        assert_eq!((denied, approved), (383, 307));
        assert!(raw.count_token("?") > 0);
    }

    #[test]
    fn test_first_row_and_labels_are_never_missing() {
        let raw = make_credit_applications(200, Some(3)).unwrap();
        assert!(raw.rows()[0].iter().all(|c| c != MISSING));
        assert!(raw.rows().iter().all(|r| r[15] != MISSING));
    }

    #[test]
    fn test_same_seed_same_table() {
        let a = make_credit_applications(50, Some(9)).unwrap();
        let b = make_credit_applications(50, Some(9)).unwrap();
        assert_eq!(a.rows(), b.rows());
    }

    #[test]
    fn test_prior_default_tracks_approval() {
        let raw = credit_approval_like(1).unwrap();
        let agree = raw
            .rows()
            .iter()
            .filter(|r| (r[8] == "t") == (r[15] == "+"))
            .count();
        assert!(agree as f64 / raw.n_rows() as f64 > 0.75);
    }
}
