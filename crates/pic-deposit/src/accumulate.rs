// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Local Accumulation Strategy
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Where the kernels write their contributions.
//!
//! Buffered merge: each patch task fills a private `LocalBuffer` sized to
//! the tile plus deposition guards and merges it once under the region
//! lock. Direct scatter: particles run in parallel and add atomically into
//! the shared field.

use crate::field::{AtomicScatter, MeshField};
use ndarray::Array4;
use pic_types::config::AccumulationStrategy;
use pic_types::error::DepositResult;
use pic_types::index::{IndexBox, IntVect};
use rayon::prelude::*;

/// Minimum particles per rayon job in direct-scatter mode.
const PARTICLE_CHUNK: usize = 256;

/// Sink for weighted stencil contributions.
pub trait Accumulator {
    fn add(&mut self, comp: usize, iv: IntVect, value: f64);
}

/// Per-particle deposition body, generic over the sink.
pub trait ScatterBody: Sync {
    /// Scatters particle `ip` into `targets`, one accumulator per
    /// destination field.
    fn run<A: Accumulator>(&self, ip: usize, targets: &mut [A]);

    /// True when every stencil point of particle `ip` lies inside the
    /// writable box of every target.
    fn fits(&self, ip: usize) -> bool;
}

/// Private, non-atomic accumulation buffer laid out `[[comp, iz, iy, ix]]`.
#[derive(Debug, Clone)]
pub struct LocalBuffer {
    bx: IndexBox,
    ncomp: usize,
    data: Array4<f64>,
}

impl Default for LocalBuffer {
    fn default() -> Self {
        Self {
            bx: IndexBox::cells([0; 3], [-1, -1, -1]),
            ncomp: 0,
            data: Array4::zeros((0, 0, 0, 0)),
        }
    }
}

impl LocalBuffer {
    /// Reshapes to `bx` with `ncomp` components and zeroes every value.
    /// The allocation is reused when the shape is unchanged.
    pub fn resize_zeroed(&mut self, bx: IndexBox, ncomp: usize) {
        let [nx, ny, nz] = bx.size();
        let shape = (ncomp, nz, ny, nx);
        if self.data.dim() == shape {
            self.data.fill(0.0);
        } else {
            self.data = Array4::zeros(shape);
        }
        self.bx = bx;
        self.ncomp = ncomp;
    }

    pub fn bx(&self) -> IndexBox {
        self.bx
    }

    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    pub fn data(&self) -> &Array4<f64> {
        &self.data
    }

    #[inline]
    fn index(&self, comp: usize, iv: IntVect) -> [usize; 4] {
        [
            comp,
            (iv[2] - self.bx.lo[2]) as usize,
            (iv[1] - self.bx.lo[1]) as usize,
            (iv[0] - self.bx.lo[0]) as usize,
        ]
    }

    pub fn get(&self, comp: usize, iv: IntVect) -> f64 {
        self.data[self.index(comp, iv)]
    }

    pub fn sum(&self) -> f64 {
        self.data.sum()
    }
}

impl Accumulator for LocalBuffer {
    #[inline]
    fn add(&mut self, comp: usize, iv: IntVect, value: f64) {
        let idx = self.index(comp, iv);
        self.data[idx] += value;
    }
}

/// Caller-owned private buffers reused across calls.
#[derive(Debug, Clone, Default)]
pub struct ScratchSpace {
    buffers: Vec<LocalBuffer>,
}

impl ScratchSpace {
    pub fn new() -> Self {
        Self::default()
    }

    fn prepare(&mut self, targets: &[ScatterTarget<'_>]) -> &mut [LocalBuffer] {
        if self.buffers.len() < targets.len() {
            self.buffers.resize_with(targets.len(), LocalBuffer::default);
        }
        for (buf, target) in self.buffers.iter_mut().zip(targets) {
            buf.resize_zeroed(target.deposit_box, target.ncomp);
        }
        &mut self.buffers[..targets.len()]
    }
}

/// One destination of a scatter: a field, its writable box and the
/// component range written.
#[derive(Debug, Clone, Copy)]
pub struct ScatterTarget<'a> {
    pub field: &'a MeshField,
    pub deposit_box: IndexBox,
    pub comp_start: usize,
    pub ncomp: usize,
}

/// Runs `body` over particles `0..np` with the chosen strategy.
pub fn scatter<B: ScatterBody>(
    strategy: AccumulationStrategy,
    body: &B,
    np: usize,
    targets: &[ScatterTarget<'_>],
    scratch: &mut ScratchSpace,
) -> DepositResult<()> {
    if np == 0 {
        return Ok(());
    }
    match strategy {
        AccumulationStrategy::BufferedMerge => {
            let buffers = scratch.prepare(targets);
            for ip in 0..np {
                body.run(ip, buffers);
            }
            for (buf, target) in buffers.iter().zip(targets) {
                target.field.lock_add(buf, target.comp_start)?;
            }
        }
        AccumulationStrategy::DirectScatter => {
            let views = targets
                .iter()
                .map(|t| t.field.scatter_view(t.comp_start, t.ncomp))
                .collect::<DepositResult<Vec<AtomicScatter<'_>>>>()?;
            (0..np)
                .into_par_iter()
                .with_min_len(PARTICLE_CHUNK)
                .for_each_with(views, |views, ip| body.run(ip, &mut views[..]));
        }
    }
    Ok(())
}
