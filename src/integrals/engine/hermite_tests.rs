use approx;

use crate::integrals::engine::boys::BoysTable;
use crate::integrals::engine::hermite::{HermiteCoefficients, HermiteCoulomb};

#[test]
fn test_hermite_coefficients_low_order() {
    let p = 1.7;
    let (xpa, xpb) = (0.3, -0.45);
    let e = HermiteCoefficients::new(2, 2, p, xpa, xpb);

    approx::assert_relative_eq!(e.get(0, 0, 0), 1.0);
    approx::assert_relative_eq!(e.get(1, 0, 0), xpa);
    approx::assert_relative_eq!(e.get(1, 0, 1), 0.5 / p);
    approx::assert_relative_eq!(e.get(0, 1, 0), xpb);
    approx::assert_relative_eq!(e.get(1, 1, 0), xpa * xpb + 0.5 / p);
    approx::assert_relative_eq!(e.get(1, 1, 1), 0.5 / p * (xpa + xpb));
    approx::assert_relative_eq!(e.get(1, 1, 2), 0.25 / (p * p));
    approx::assert_relative_eq!(e.get(2, 0, 0), xpa * xpa + 0.5 / p);
    assert_eq!(e.get(1, 0, 2), 0.0);
    assert_eq!(e.slice(2, 1).len(), 4);
}

#[test]
fn test_hermite_coulomb_low_order() {
    let boys = BoysTable::new(4);
    let a = 0.8;
    let r = [0.2, -0.5, 1.1];
    let rr = HermiteCoulomb::new(a, r, 2, &boys);

    let mut f = [0.0; 3];
    boys.evaluate(a * (r[0] * r[0] + r[1] * r[1] + r[2] * r[2]), &mut f);
    approx::assert_relative_eq!(rr.get(0, 0, 0), f[0], epsilon = 1e-14);
    approx::assert_relative_eq!(rr.get(1, 0, 0), -2.0 * a * r[0] * f[1], epsilon = 1e-14);
    approx::assert_relative_eq!(rr.get(0, 0, 1), -2.0 * a * r[2] * f[1], epsilon = 1e-14);
    approx::assert_relative_eq!(
        rr.get(2, 0, 0),
        -2.0 * a * f[1] + 4.0 * a * a * r[0] * r[0] * f[2],
        epsilon = 1e-14
    );
    approx::assert_relative_eq!(
        rr.get(0, 1, 1),
        4.0 * a * a * r[1] * r[2] * f[2],
        epsilon = 1e-14
    );
}
