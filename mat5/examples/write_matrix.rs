//! Write a MAT-file holding one of each array kind, then read it back

use mat5::{
    Array, CellArray, LogicalArray, MatFile, NumericArray, SparseArray, StructArray, WriteOptions,
};
use std::time::Instant;

fn main() -> mat5::Result<()> {
    let filename = "example_arrays.mat";

    let m1 = Array::double("m1", &[3, 2], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
    let bytes = Array::from(NumericArray::<u8>::from_rows("bytes", &[vec![0, 128, 255]])?);
    let mask = Array::from(LogicalArray::from_vec("mask", &[1, 4], vec![true, false, false, true])?);
    let label = Array::string("label", "sample run");

    let mut sparse = SparseArray::new("sp", 1000, 1000);
    for i in (0..1000).step_by(7) {
        sparse.set(i, (i * 13) % 1000, i as f64)?;
    }

    let mut cell = CellArray::new("c", &[1, 2]);
    cell.set_at(0, 0, Array::scalar("@", 42.0))?;
    cell.set_at(0, 1, Array::string("@", "inside"))?;

    let config = StructArray::scalar("config")
        .with_field("rate", Array::scalar("rate", 44100.0))?
        .with_field("name", Array::string("name", "mic"))?;

    let arrays = [
        m1,
        bytes,
        mask,
        label,
        Array::from(sparse),
        Array::from(cell),
        Array::from(config),
    ];

    let start = Instant::now();
    MatFile::write(filename, &arrays, &WriteOptions::default())?;
    println!("Wrote {} arrays in {:.2?}", arrays.len(), start.elapsed());

    let start = Instant::now();
    let back = MatFile::open(filename).read_all()?;
    println!("Read {} arrays in {:.2?}", back.len(), start.elapsed());
    for info in mat5::summarize(&back) {
        println!("  {info}");
    }
    Ok(())
}
