use std::io::{self, Write};
use std::path::Path;

use crate::optimizer::TrajectoryResult;

/// Write an optimized trajectory as CSV, one row per knot.
///
/// Columns: time, x, z, theta, phi, vx, vz. Time is `knot * timestep`.
pub fn write_trajectory<W: Write>(
    writer: &mut W,
    trajectory: &TrajectoryResult,
    timestep: f64,
) -> io::Result<()> {
    writeln!(writer, "time,x,z,theta,phi,vx,vz")?;

    for i in 0..trajectory.len() {
        writeln!(
            writer,
            "{:.4},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
            i as f64 * timestep,
            trajectory.x[i],
            trajectory.z[i],
            trajectory.theta[i],
            trajectory.phi[i],
            trajectory.vx[i],
            trajectory.vz[i],
        )?;
    }

    Ok(())
}

/// Write the trajectory CSV to a file at the given path.
pub fn write_trajectory_file(
    path: &Path,
    trajectory: &TrajectoryResult,
    timestep: f64,
) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_trajectory(&mut file, trajectory, timestep)
}
