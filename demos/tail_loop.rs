//! Tail Loop Demonstration
//!
//! Computes `y = a * x + y` over a slice whose length is not a multiple of
//! the vector width, once per shape, using a masked final iteration instead
//! of a scalar epilogue. Then shows the errors an out-of-range access or a
//! zero integer divisor produce.

use lanevec::{BinaryOp, LanevecError, Mask, Species, TernaryOp, Vector, VectorShape};

fn axpy(species: &'static Species<f32>, a: f32, x: &[f32], y: &mut [f32]) -> lanevec::Result<()> {
    let va = species.broadcast(a);
    let bound = species.loop_bound(x.len());

    let mut i = 0;
    while i < bound {
        let vx = Vector::from_slice(species, x, i)?;
        let vy = Vector::from_slice(species, y, i)?;
        va.lanewise_ternary(TernaryOp::Fma, &vx, &vy)?.into_slice(y, i)?;
        i += species.lane_count();
    }

    // Final partial iteration: only lanes below x.len() are touched
    let m = Mask::index_in_upper_range(species, i, x.len());
    let vx = Vector::from_slice_masked(species, x, i, &m)?;
    let vy = Vector::from_slice_masked(species, y, i, &m)?;
    va.lanewise_ternary_masked(TernaryOp::Fma, &vx, &vy, &m)?
        .into_slice_masked(y, i, &m)
}

fn main() -> lanevec::Result<()> {
    println!("Tail loop demonstration\n");

    let x: Vec<f32> = (0..13).map(|i| i as f32).collect();
    for shape in VectorShape::ALL {
        let species = Species::<f32>::of(shape);
        let mut y = vec![1.0f32; x.len()];
        axpy(species, 2.0, &x, &mut y)?;
        println!(
            "   {:>8} ({:>2} lanes, loop bound {:>2}): {:?}",
            species.to_string(),
            species.lane_count(),
            species.loop_bound(x.len()),
            y
        );
    }
    println!(
        "   preferred shape on this machine: {}\n",
        VectorShape::preferred()
    );

    println!("Errors are values, not panics:");
    let ints = Species::<i32>::of(VectorShape::S128);
    match Vector::from_slice(ints, &[1, 2, 3][..], 0) {
        Ok(v) => println!("   unexpected load: {v:?}"),
        Err(e) => println!("   {e}"),
    }

    let a = ints.from_values(&[10, 20, 30, 40])?;
    let b = ints.from_values(&[1, 0, 3, 4])?;
    match a.lanewise(BinaryOp::Div, &b) {
        Err(LanevecError::ArithmeticError { lane, message }) => {
            println!("   lane {lane}: {message}");
            let skip = Mask::from_bools(ints, &[true, false, true, true])?;
            println!(
                "   with lane {lane} masked off: {:?}",
                a.lanewise_masked(BinaryOp::Div, &b, &skip)?.to_vec()
            );
        }
        other => println!("   unexpected: {other:?}"),
    }

    Ok(())
}
