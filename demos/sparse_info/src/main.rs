use argh::FromArgs;
use rand::{rngs::StdRng, Rng, SeedableRng};

use lattix::sparse::{self, SparseTensor};
use lattix::tensor::{CpuAllocator, Tensor};

#[derive(FromArgs)]
/// Build a random sparse matrix and print what the engine computes from it
struct Args {
    /// number of rows
    #[argh(option, short = 'r', default = "8")]
    rows: usize,

    /// number of columns
    #[argh(option, short = 'c', default = "8")]
    cols: usize,

    /// number of entries to draw, duplicates included
    #[argh(option, short = 'n', default = "12")]
    nnz: usize,

    /// seed of the random generator
    #[argh(option, short = 's', default = "42")]
    seed: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    if args.rows == 0 || args.cols == 0 {
        return Err("rows and cols must be positive".into());
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let indices = (0..args.nnz)
        .map(|_| [rng.random_range(0..args.rows), rng.random_range(0..args.cols)])
        .collect();
    let values = (0..args.nnz).map(|_| rng.random_range(-9..10)).collect();

    let t = SparseTensor::<i64, 2>::new([args.rows, args.cols], indices, values)?;
    log::info!("drew {} entries into a {:?} matrix", t.nnz(), t.shape());

    println!("{t}");

    let c = sparse::canonicalize(&t);
    println!(
        "canonical: {} entries, density {:.3}, sparsity {:.3}",
        c.nnz(),
        c.density(),
        c.sparsity()
    );

    println!("dense:\n{}", sparse::to_dense(&c, CpuAllocator)?);

    let ones = Tensor::<i64, 2, _>::from_shape_val([args.cols, 1], 1, CpuAllocator)?;
    println!("row sums:\n{}", sparse::sparse_dense_matmul(&c, &ones)?);

    match sparse::reduce_max(&c, 0, CpuAllocator) {
        Ok(max) => println!("column max over stored entries:\n{max}"),
        Err(e) => println!("column max unavailable: {e}"),
    }

    Ok(())
}
