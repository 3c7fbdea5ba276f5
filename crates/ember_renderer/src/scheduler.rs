//! Multithreaded render scheduling.
//!
//! A render moves through three states:
//!
//! - **Pending**: the image is split into [`RowBlock`]s and every block is
//!   queued on a bounded job channel.
//! - **Dispatched**: a fixed pool of workers drains the queue, one block at
//!   a time, and sends each finished block back on a result channel.
//! - **Completed**: the orchestrating thread has counted one result per
//!   dispatched block; the pool is joined and the blocks are merged.
//!
//! Every block renders with its own random stream seeded from the render
//! seed and the block index, so a fixed seed gives the same image no
//! matter how many workers run or which worker picks up which block.

use crate::block::{generate_blocks, render_block, BlockResult, RowBlock, DEFAULT_BLOCK_ROWS};
use crate::output::ImageBuffer;
use crate::{Camera, Scene};
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::num::NonZeroUsize;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::time::Instant;

/// Scheduler settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Rows per block
    pub rows_per_block: u32,
    /// Worker count; `None` uses the available hardware parallelism
    pub threads: Option<usize>,
    /// Base seed for the per-block random streams; `None` picks one at random
    pub seed: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            rows_per_block: DEFAULT_BLOCK_ROWS,
            threads: None,
            seed: None,
        }
    }
}

impl RenderConfig {
    /// Number of workers to start for `blocks` blocks of work.
    ///
    /// Never zero and never more than there are blocks.
    pub fn worker_count(&self, blocks: usize) -> usize {
        let requested = self.threads.unwrap_or_else(available_workers);
        requested.max(1).min(blocks.max(1))
    }
}

/// Lifecycle of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Pending,
    Dispatched,
    Completed,
}

/// Bookkeeping for the completion barrier.
#[derive(Debug)]
struct Progress {
    state: RenderState,
    dispatched: usize,
    completed: usize,
    rows_remaining: u32,
}

impl Progress {
    fn new(rows: u32) -> Self {
        Self {
            state: RenderState::Pending,
            dispatched: 0,
            completed: 0,
            rows_remaining: rows,
        }
    }

    fn dispatch(&mut self, blocks: usize) {
        debug_assert_eq!(self.state, RenderState::Pending);
        self.dispatched = blocks;
        self.transition(if blocks == 0 {
            RenderState::Completed
        } else {
            RenderState::Dispatched
        });
    }

    fn complete(&mut self, block: &RowBlock) {
        debug_assert_eq!(
            self.state,
            RenderState::Dispatched,
            "result for block {} after completion",
            block.index
        );
        self.completed += 1;
        self.rows_remaining = self.rows_remaining.saturating_sub(block.row_count());
        debug!(
            "Block {} done ({}/{}), rows remaining: {}",
            block.index, self.completed, self.dispatched, self.rows_remaining
        );
        if self.completed == self.dispatched {
            self.transition(RenderState::Completed);
        }
    }

    fn is_complete(&self) -> bool {
        self.state == RenderState::Completed
    }

    fn transition(&mut self, state: RenderState) {
        trace!("Render state {:?} -> {:?}", self.state, state);
        self.state = state;
    }
}

/// Hardware parallelism, falling back to a single worker when it cannot
/// be determined.
fn available_workers() -> usize {
    match std::thread::available_parallelism() {
        Ok(n) => NonZeroUsize::get(n),
        Err(e) => {
            warn!("Could not query hardware parallelism ({}), using 1 worker", e);
            1
        }
    }
}

/// Independent random stream for one block.
fn block_rng(seed: u64, block_index: usize) -> StdRng {
    StdRng::seed_from_u64(seed ^ (block_index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Worker loop: take blocks off the shared queue until it is drained.
fn run_worker(
    worker: usize,
    jobs: &Mutex<Receiver<RowBlock>>,
    results: Sender<BlockResult>,
    camera: &Camera,
    scene: &Scene,
    seed: u64,
) {
    let mut rendered = 0;
    loop {
        // Hold the lock only while popping
        let next = match jobs.lock() {
            Ok(queue) => queue.try_recv(),
            Err(_) => break,
        };
        let Ok(block) = next else {
            break;
        };

        let mut rng = block_rng(seed, block.index);
        let result = render_block(&block, camera, scene, &mut rng);
        rendered += 1;
        if results.send(result).is_err() {
            break;
        }
    }
    trace!("Worker {} finished after {} blocks", worker, rendered);
}

/// Wait until one result per dispatched block has arrived.
fn collect_results(results: &Receiver<BlockResult>, progress: &mut Progress) -> Vec<BlockResult> {
    let mut completed = Vec::with_capacity(progress.dispatched);

    while !progress.is_complete() {
        match results.recv() {
            Ok(result) => {
                progress.complete(&result.block);
                completed.push(result);
            }
            // Every worker hung up early; a panicking worker is re-raised
            // when the pool scope ends
            Err(_) => break,
        }
    }

    completed
}

/// Queue every block on a bounded job channel and mark them dispatched.
fn queue_blocks(blocks: Vec<RowBlock>, progress: &mut Progress) -> Mutex<Receiver<RowBlock>> {
    let (job_tx, job_rx) = mpsc::sync_channel(blocks.len());
    progress.dispatch(blocks.len());
    for block in blocks {
        let queued = job_tx.send(block);
        debug_assert!(queued.is_ok(), "job queue closed while dispatching");
    }
    Mutex::new(job_rx)
}

/// Drain the queue with a single worker on the calling thread.
fn render_inline(
    jobs: &Mutex<Receiver<RowBlock>>,
    progress: &mut Progress,
    camera: &Camera,
    scene: &Scene,
    seed: u64,
) -> Vec<BlockResult> {
    let (result_tx, result_rx) = mpsc::channel();
    run_worker(0, jobs, result_tx, camera, scene, seed);
    collect_results(&result_rx, progress)
}

/// Render all blocks of the image and return them in completion order.
pub fn render_blocks(camera: &Camera, scene: &Scene, config: &RenderConfig) -> Vec<BlockResult> {
    let mut progress = Progress::new(camera.image_height());
    let blocks = generate_blocks(camera.image_width(), camera.image_height(), config.rows_per_block);
    let workers = config.worker_count(blocks.len());
    let seed = config.seed.unwrap_or_else(rand::random);

    // Pending: queue every block before any worker starts
    let jobs = queue_blocks(blocks, &mut progress);
    debug!("Dispatched {} blocks to {} workers (seed {})", progress.dispatched, workers, seed);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("ember-worker-{}", i))
        .build();

    let completed = match pool {
        Ok(pool) => pool.in_place_scope(|scope| {
            let (result_tx, result_rx) = mpsc::channel();
            for worker in 0..workers {
                let results = result_tx.clone();
                let jobs = &jobs;
                scope.spawn(move |_| run_worker(worker, jobs, results, camera, scene, seed));
            }
            drop(result_tx);
            collect_results(&result_rx, &mut progress)
        }),
        Err(e) => {
            warn!("Failed to start worker pool ({}), rendering on the calling thread", e);
            render_inline(&jobs, &mut progress, camera, scene, seed)
        }
    };

    debug_assert_eq!(completed.len(), progress.dispatched, "lost render blocks");
    completed
}

/// Render the scene to an image buffer using a pool of worker threads.
pub fn render(camera: &Camera, scene: &Scene, config: &RenderConfig) -> ImageBuffer {
    let width = camera.image_width();
    let height = camera.image_height();
    info!(
        "Rendering {}x{} @ {} spp, max depth {}, {} objects",
        width,
        height,
        camera.samples_per_pixel(),
        camera.max_depth(),
        scene.len()
    );

    let start = Instant::now();
    let blocks = render_blocks(camera, scene, config);
    let image = ImageBuffer::from_blocks(width, height, blocks);

    info!("Rendered in {:.2?}", start.elapsed());
    image
}
