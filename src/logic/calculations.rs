use crate::models::{Deficiency, Npk};

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Nutrient shortfall of `current` against `required`, floored at zero.
pub fn deficiency(current: &Npk, required: &Npk) -> Deficiency {
    Deficiency {
        n: (required.n - current.n).max(0.0),
        p: (required.p - current.p).max(0.0),
        k: (required.k - current.k).max(0.0),
    }
}

/// Kilograms of product needed to supply `deficit` kg of a nutrient at `pct` percent.
pub fn product_quantity(deficit: f64, pct: f64) -> f64 {
    round2(deficit / pct * 100.0)
}

/// Mean of `values`, rounded to two decimals. `None` when empty.
pub fn mean2(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(round2(sum / count as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(86.956_521), 86.96);
        assert_eq!(round2(0.833_333), 0.83);
        assert_eq!(round2(22.5), 22.5);
    }

    #[test]
    fn test_deficiency_basic() {
        let d = deficiency(&Npk::new(10.0, 5.0, 5.0), &Npk::new(50.0, 25.0, 25.0));
        assert_eq!(d, Deficiency { n: 40.0, p: 20.0, k: 20.0 });
    }

    #[test]
    fn test_deficiency_never_negative() {
        let d = deficiency(&Npk::new(200.0, 10.0, 90.0), &Npk::new(60.0, 30.0, 30.0));
        assert_eq!(d.n, 0.0);
        assert_eq!(d.p, 20.0);
        assert_eq!(d.k, 0.0);
    }

    #[test]
    fn test_product_quantity() {
        // 40 kg N from 46% urea
        assert_eq!(product_quantity(40.0, 46.0), 86.96);
        assert_eq!(product_quantity(30.0, 60.0), 50.0);
    }

    #[test]
    fn test_mean2() {
        assert_eq!(mean2([1.0, 2.0, 2.0]), Some(1.67));
        assert_eq!(mean2(Vec::<f64>::new()), None);
    }
}
