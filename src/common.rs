//! Scalar root finding and quadrature support for the curve math.
//!
//! The curve modules work with polynomials in Bernstein form (control
//! values over the unit interval); [`bernstein_roots`] is the entry point
//! they use. The power-basis solvers underneath are exposed too, for
//! callers that already hold coefficients in that form.

use arrayvec::ArrayVec;

/// Real roots of the polynomial with the given Bernstein control values.
///
/// `vals` holds two to four control values describing a polynomial of
/// degree `vals.len() - 1` over the unit interval. The control values are
/// converted to the power basis and solved analytically. Roots over all of
/// the reals are returned, not just those inside [0, 1]; callers filter to
/// the range they care about.
///
/// A constant polynomial (all control values equal) reports no roots, even
/// when that constant is zero. Other slice lengths also yield an empty list.
pub fn bernstein_roots(vals: &[f64]) -> ArrayVec<f64, 3> {
    let mut roots = ArrayVec::new();
    match *vals {
        [b0, b1] => {
            if b0 != b1 {
                roots.push(b0 / (b0 - b1));
            }
        }
        [b0, b1, b2] => {
            roots.extend(quadratic_roots(b0, 2.0 * (b1 - b0), b0 - 2.0 * b1 + b2));
        }
        [b0, b1, b2, b3] => {
            let c3 = -b0 + 3.0 * b1 - 3.0 * b2 + b3;
            let c2 = 3.0 * b0 - 6.0 * b1 + 3.0 * b2;
            let c1 = -3.0 * b0 + 3.0 * b1;
            roots.extend(cubic_roots(b0, c1, c2, c3));
        }
        _ => {}
    }
    roots
}

/// Real roots of c0 + c1 x + c2 x².
///
/// Written to stay usable near the degenerate cases: a vanishing (or tiny)
/// `c2` falls back to the linear solution, the larger-magnitude root is
/// computed first to avoid cancellation, and the second root comes from
/// the product of the roots rather than the other branch of the formula.
/// Two roots come back sorted; a double root is reported once. When every
/// coefficient is zero a single representative `0.0` is returned.
pub fn quadratic_roots(c0: f64, c1: f64, c2: f64) -> ArrayVec<f64, 2> {
    let mut roots = ArrayVec::new();
    let a = c1 / c2;
    let b = c0 / c2;
    if !a.is_finite() || !b.is_finite() {
        // effectively linear
        let linear = -c0 / c1;
        if linear.is_finite() {
            roots.push(linear);
        } else if c0 == 0.0 && c1 == 0.0 {
            roots.push(0.0);
        }
        return roots;
    }
    let disc = a * a - 4.0 * b;
    let first = if !disc.is_finite() {
        // a² overflowed; that root dominates, the second follows below
        -a
    } else {
        if disc < 0.0 {
            return roots;
        }
        if disc == 0.0 {
            roots.push(-0.5 * a);
            return roots;
        }
        -0.5 * (a + disc.sqrt().copysign(a))
    };
    let second = b / first;
    if second.is_finite() {
        roots.push(first.min(second));
        roots.push(first.max(second));
    } else {
        roots.push(first);
    }
    roots
}

/// Real roots of c0 + c1 x + c2 x² + c3 x³.
///
/// Follows Blinn's cubic treatment (via the discussion at
/// <https://momentsingraphics.de/CubicRoots.html>): normalize by the cubic
/// coefficient, depress, and branch on the discriminant sign for one, two
/// or three real roots. When `c3` is zero, or small enough that the
/// normalization overflows, the equation is handed to [`quadratic_roots`].
pub fn cubic_roots(c0: f64, c1: f64, c2: f64, c3: f64) -> ArrayVec<f64, 3> {
    let mut roots = ArrayVec::new();
    let inv = c3.recip();
    let q2 = c2 * inv * (1.0 / 3.0);
    let q1 = c1 * inv * (1.0 / 3.0);
    let q0 = c0 * inv;
    if !(q0.is_finite() && q1.is_finite() && q2.is_finite()) {
        roots.extend(quadratic_roots(c0, c1, c2));
        return roots;
    }
    // invariants of the normalized cubic, and its depressed form
    let d0 = q1 - q2 * q2;
    let d1 = q0 - q1 * q2;
    let d2 = q2 * q0 - q1 * q1;
    let disc = 4.0 * d0 * d2 - d1 * d1;
    let de = d1 - 2.0 * q2 * d0;
    if disc < 0.0 {
        // one real root, by Cardano
        let sq = (-0.25 * disc).sqrt();
        let half = -0.5 * de;
        roots.push((half + sq).cbrt() + (half - sq).cbrt() - q2);
    } else if disc == 0.0 {
        // a double root and a simple root
        let t = (-d0).sqrt().copysign(de);
        roots.push(t - q2);
        roots.push(-2.0 * t - q2);
    } else {
        // three distinct real roots, by the trigonometric form
        let th = disc.sqrt().atan2(-de) * (1.0 / 3.0);
        let (th_sin, th_cos) = th.sin_cos();
        let ss3 = th_sin * 3.0_f64.sqrt();
        let scale = 2.0 * (-d0).sqrt();
        roots.push(scale * th_cos - q2);
        roots.push(scale * 0.5 * (-th_cos + ss3) - q2);
        roots.push(scale * 0.5 * (-th_cos - ss3) - q2);
    }
    roots
}

/// Weight/abscissa pairs for order-24 Gauss-Legendre quadrature over
/// [-1, 1], used by arc-length integration. Values adapted from
/// <https://pomax.github.io/bezierinfo/legendre-gauss.html>.
pub const GAUSS_LEGENDRE_COEFFS_24: &[(f64, f64)] = &[
    (0.1279381953467522, -0.0640568928626056),
    (0.1279381953467522, 0.0640568928626056),
    (0.1258374563468283, -0.1911188674736163),
    (0.1258374563468283, 0.1911188674736163),
    (0.1216704729278034, -0.3150426796961634),
    (0.1216704729278034, 0.3150426796961634),
    (0.1155056680537256, -0.4337935076260451),
    (0.1155056680537256, 0.4337935076260451),
    (0.1074442701159656, -0.5454214713888396),
    (0.1074442701159656, 0.5454214713888396),
    (0.0976186521041139, -0.6480936519369755),
    (0.0976186521041139, 0.6480936519369755),
    (0.0861901615319533, -0.7401241915785544),
    (0.0861901615319533, 0.7401241915785544),
    (0.0733464814110803, -0.8200019859739029),
    (0.0733464814110803, 0.8200019859739029),
    (0.0592985849154368, -0.8864155270044011),
    (0.0592985849154368, 0.8864155270044011),
    (0.0442774388174198, -0.9382745520027328),
    (0.0442774388174198, 0.9382745520027328),
    (0.0285313886289337, -0.9747285559713095),
    (0.0285313886289337, 0.9747285559713095),
    (0.0123412297999872, -0.9951872199970213),
    (0.0123412297999872, 0.9951872199970213),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn check<const N: usize>(mut roots: ArrayVec<f64, N>, expected: &[f64]) {
        assert_eq!(roots.len(), expected.len(), "wrong root count");
        roots.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for (i, (got, want)) in roots.iter().zip(expected).enumerate() {
            assert!((got - want).abs() < 1e-10, "root {i}: {got} vs {want}");
        }
    }

    #[test]
    fn quadratic() {
        // (x + 2)(x - 3)
        check(quadratic_roots(-6.0, -1.0, 1.0), &[-2.0, 3.0]);
        // (x - 2)², an exact double root
        check(quadratic_roots(4.0, -4.0, 1.0), &[2.0]);
        // x² + 4 has no real roots
        check(quadratic_roots(4.0, 0.0, 1.0), &[]);
        // degenerates to linear: 2x - 8
        check(quadratic_roots(-8.0, 2.0, 0.0), &[4.0]);
    }

    #[test]
    fn cubic() {
        // (x - 1)(x + 2)(x - 4)
        check(cubic_roots(8.0, -6.0, -3.0, 1.0), &[-2.0, 1.0, 4.0]);
        // x³ - 2 has a single real root
        check(cubic_roots(-2.0, 0.0, 0.0, 1.0), &[2.0_f64.cbrt()]);
        // a vanished leading coefficient hands off to the quadratic
        check(cubic_roots(-6.0, 1.0, 1.0, 0.0), &[-3.0, 2.0]);
    }

    #[test]
    fn bernstein_control_values() {
        // -1*(1-t) + 3*t crosses zero at t = 1/4
        check(bernstein_roots(&[-1.0, 3.0]), &[0.25]);
        // a constant polynomial has no isolated roots
        check(bernstein_roots(&[2.0, 2.0]), &[]);
        // [1, -1, 1] is ((1-t) - t)², a double root at the middle
        check(bernstein_roots(&[1.0, -1.0, 1.0]), &[0.5]);
        // -(1-t)³ + t³ is monotone with its only zero at t = 1/2
        check(bernstein_roots(&[-1.0, 0.0, 0.0, 1.0]), &[0.5]);
    }

    #[test]
    fn quadrature_weights_sum_to_two() {
        let sum: f64 = GAUSS_LEGENDRE_COEFFS_24.iter().map(|(w, _)| w).sum();
        assert!((sum - 2.0).abs() < 1e-12, "weights must sum to 2");
    }
}
