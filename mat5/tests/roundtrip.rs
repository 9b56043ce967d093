//! End-to-end encode/decode behaviour of whole containers

use mat5::{
    parse_header, read_all, read_one, write_all, Array, ArrayFilter, ByteOrder, CellArray,
    ErrorCategory, IncrementalWriter, LogicalArray, MatElement, NumericArray, ObjectArray,
    OpaqueArray, ReadOptions, SparseArray, StructArray, WriteOptions,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn all_options() -> Vec<WriteOptions> {
    let mut options = Vec::new();
    for compress in [false, true] {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            for compact in [false, true] {
                options.push(
                    WriteOptions::default()
                        .with_compression(compress)
                        .with_byte_order(order)
                        .with_compact_tags(compact),
                );
            }
        }
    }
    options
}

fn round_trip(arrays: &[Array], options: &WriteOptions) -> Vec<Array> {
    let bytes = write_all(arrays, options).unwrap();
    read_all(&bytes, &ReadOptions::default()).unwrap().into_vec()
}

#[test]
fn test_m1_scenario() {
    let m1 = NumericArray::<f64>::from_rows("m1", &[vec![1.3, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]])
        .unwrap();
    for options in all_options() {
        let back = round_trip(&[Array::from(m1.clone())], &options);
        let m = back[0].as_double().unwrap();
        assert_eq!(m.name(), "m1");
        assert_eq!(m.dims(), &[3, 2]);
        assert_eq!(m.get(0, 0).unwrap(), 1.3);
        assert_eq!(m.get(2, 1).unwrap(), 6.0);
    }
}

#[test]
fn test_struct_fields_keep_values_and_order() {
    let s = StructArray::scalar("s")
        .with_field("f1", Array::scalar("f1", 42.0))
        .unwrap()
        .with_field("f2", Array::string("f2", "hi"))
        .unwrap();
    for options in all_options() {
        let back = round_trip(&[Array::from(s.clone())], &options);
        let decoded = back[0].as_struct().unwrap();
        assert_eq!(decoded.field_names(), &["f1".to_string(), "f2".to_string()]);
        assert_eq!(decoded.field("f1").unwrap().get_f64(0, 0).unwrap(), 42.0);
        assert_eq!(decoded.field("f2").unwrap().as_char().unwrap().as_string(), "hi");
    }
}

#[test]
fn test_uint8_extremes() {
    let a = Array::from(NumericArray::<u8>::from_rows("u", &[vec![0, 255]]).unwrap());
    for options in all_options() {
        let back = round_trip(std::slice::from_ref(&a), &options);
        assert_eq!(back[0].as_uint8().unwrap().real_values(), vec![0, 255]);
        assert_eq!(back[0], a);
    }
}

#[test]
fn test_nan_is_preserved() {
    let a = Array::double("n", &[1, 3], vec![f64::NAN, 1.0, f64::NEG_INFINITY]).unwrap();
    let back = round_trip(&[a], &WriteOptions::default());
    let values = back[0].as_double().unwrap().real_values();
    assert!(values[0].is_nan());
    assert_eq!(values[2], f64::NEG_INFINITY);
}

#[test]
fn test_invalid_name_produces_no_output() {
    let bad = Array::scalar("1bad", 1.0);
    let err = write_all([&bad], &WriteOptions::default()).unwrap_err();
    assert!(err.is_argument());

    let mut writer = IncrementalWriter::new(Vec::new(), WriteOptions::default());
    assert!(writer.write(&bad).unwrap_err().is_argument());
    // only the header of an otherwise empty session
    assert_eq!(writer.finish().unwrap().len(), 128);
}

#[test]
fn test_filter_skips_and_continues() {
    let arrays = [
        Array::scalar("a", 1.0),
        Array::from(CellArray::new("skipped", &[2, 2])),
        Array::string("b", "after"),
    ];
    for options in all_options() {
        let bytes = write_all(&arrays, &options).unwrap();
        let read = ReadOptions::default().with_filter(ArrayFilter::only(["a", "b"]));
        let map = read_all(&bytes, &read).unwrap();
        assert!(!map.contains("skipped"));
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("b").unwrap().as_char().unwrap().as_string(), "after");
    }
}

#[test]
fn test_one_header_per_session() {
    for n in 1..5 {
        let mut writer = IncrementalWriter::new(Vec::new(), WriteOptions::default());
        for i in 0..n {
            writer.write(&Array::scalar(&format!("v{i}"), i as f64)).unwrap();
        }
        let bytes = writer.finish().unwrap();
        let headers = bytes
            .windows(19)
            .filter(|w| *w == b"MATLAB 5.0 MAT-file")
            .count();
        assert_eq!(headers, 1);
        assert_eq!(read_all(&bytes, &ReadOptions::default()).unwrap().len(), n);
    }
}

#[test]
fn test_elements_are_eight_byte_aligned() {
    let arrays = [
        Array::string("odd", "abc"),
        Array::from(NumericArray::<i8>::from_column("i8", &[1, 2, 3, 4, 5])),
        Array::from(LogicalArray::from_vec("l", &[1, 3], vec![true, false, true]).unwrap()),
    ];
    let options = WriteOptions::default().with_compression(false);
    let bytes = write_all(&arrays, &options).unwrap();
    let mut offset = 128;
    while offset < bytes.len() {
        let size = u32::from_le_bytes(bytes[offset + 4..offset + 8].try_into().unwrap()) as usize;
        let padding = (8 - size % 8) % 8;
        assert!(padding < 8);
        assert_eq!((size + padding) % 8, 0);
        offset += 8 + size + padding;
    }
    assert_eq!(offset, bytes.len());
}

#[test]
fn test_sparse_coordinates_survive() {
    let mut sparse = SparseArray::new_complex("sp", 6, 5);
    sparse.set(0, 0, 1.0).unwrap();
    sparse.set(5, 0, -2.0).unwrap();
    sparse.set(3, 3, 0.25).unwrap();
    sparse.set_imag(3, 3, 9.0).unwrap();
    let expected = sparse.indices().count();
    for options in all_options() {
        let back = round_trip(&[Array::from(sparse.clone())], &options);
        let s = back[0].as_sparse().unwrap();
        assert_eq!(s, &sparse);
        assert_eq!(*s.column_pointers().last().unwrap(), expected);
        assert_eq!(s.get(3, 3).unwrap(), 0.25);
        assert_eq!(s.get_imag(3, 3).unwrap(), 9.0);
        assert_eq!(s.get(1, 1).unwrap(), 0.0);
        assert_eq!(s.get(4, 4).unwrap(), 0.0);
    }
}

#[test]
fn test_logical_sparse() {
    let mut sparse = SparseArray::new_logical("mask", 3, 3);
    sparse.set(1, 2, 1.0).unwrap();
    let back = round_trip(&[Array::from(sparse.clone())], &WriteOptions::default());
    let s = back[0].as_sparse().unwrap();
    assert!(s.is_logical());
    assert_eq!(s.get(1, 2).unwrap(), 1.0);
}

#[test]
fn test_object_and_opaque() {
    let mut obj = ObjectArray::new("p", "Point", &[1, 1]);
    obj.fields_mut()
        .set_field("x", Array::scalar("x", 3.0))
        .unwrap();
    let opaque = OpaqueArray::new(
        "h",
        "MCOS",
        "FileWrapper__",
        Array::from(NumericArray::<u32>::from_column("", &[0xDD00_0000, 2, 1, 1])),
    );
    let arrays = [Array::from(obj), Array::from(opaque)];
    for options in all_options() {
        assert_eq!(round_trip(&arrays, &options), arrays.to_vec());
    }
}

#[test]
fn test_read_one_finds_later_array() {
    let arrays = [Array::scalar("first", 1.0), Array::string("second", "x")];
    let bytes = write_all(&arrays, &WriteOptions::default()).unwrap();
    assert_eq!(read_one(&bytes, "second").unwrap(), Some(arrays[1].clone()));
    assert_eq!(read_one(&bytes, "missing").unwrap(), None);
}

#[test]
fn test_truncated_file_is_a_format_error() {
    let bytes = write_all([&Array::scalar("x", 1.0)], &WriteOptions::default()).unwrap();
    let err = read_all(&bytes[..bytes.len() - 3], &ReadOptions::default()).unwrap_err();
    assert!(err.is_format());
}

fn random_numeric<T, F>(rng: &mut StdRng, name: &str, complex: bool, mut gen: F) -> NumericArray<T>
where
    T: MatElement,
    F: FnMut(&mut StdRng) -> T,
{
    let dims = [rng.gen_range(1..6), rng.gen_range(1..6)];
    let count = dims[0] * dims[1];
    let real = (0..count).map(|_| gen(rng)).collect();
    let array = NumericArray::from_vec(name, &dims, real).unwrap();
    if complex {
        let imag = (0..count).map(|_| gen(rng)).collect();
        array.with_imag(imag).unwrap()
    } else {
        array
    }
}

#[test]
fn test_random_arrays_of_every_numeric_class() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for round in 0..8 {
        let complex = round % 2 == 1;
        let arrays: Vec<Array> = vec![
            random_numeric(&mut rng, "d", complex, |r| r.gen::<f64>() * 1e6 - 5e5).into(),
            random_numeric(&mut rng, "s", complex, |r| r.gen::<f32>()).into(),
            random_numeric(&mut rng, "i8", complex, |r| r.gen::<i8>()).into(),
            random_numeric(&mut rng, "u8", complex, |r| r.gen::<u8>()).into(),
            random_numeric(&mut rng, "i16", complex, |r| r.gen::<i16>()).into(),
            random_numeric(&mut rng, "u16", complex, |r| r.gen::<u16>()).into(),
            random_numeric(&mut rng, "i32", complex, |r| r.gen::<i32>()).into(),
            random_numeric(&mut rng, "u32", complex, |r| r.gen::<u32>()).into(),
            random_numeric(&mut rng, "i64", complex, |r| r.gen::<i64>()).into(),
            random_numeric(&mut rng, "u64", complex, |r| r.gen::<u64>()).into(),
            LogicalArray::from_vec("l", &[2, 3], (0..6).map(|_| rng.gen::<bool>()).collect())
                .unwrap()
                .into(),
        ];
        for options in all_options() {
            assert_eq!(round_trip(&arrays, &options), arrays);
        }
    }
}

#[test]
fn test_random_sparse_matrices() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..10 {
        let (rows, cols) = (rng.gen_range(1..40), rng.gen_range(1..40));
        let mut sparse = SparseArray::new("r", rows, cols);
        for _ in 0..rng.gen_range(0..60) {
            let (r, c) = (rng.gen_range(0..rows), rng.gen_range(0..cols));
            sparse.set(r, c, rng.gen_range(-100.0..100.0)).unwrap();
        }
        let array = Array::from(sparse);
        let back = round_trip(std::slice::from_ref(&array), &WriteOptions::default());
        assert_eq!(back[0], array);
    }
}

#[test]
fn test_nested_cells_round_trip() {
    let mut inner = CellArray::new("", &[1, 2]);
    inner.set(0, Array::scalar("", 1.0)).unwrap();
    inner.set(1, Array::string("", "deep")).unwrap();
    let mut outer = CellArray::new("outer", &[2, 1]);
    outer.set(0, Array::from(inner)).unwrap();
    let outer = Array::from(outer);
    for options in all_options() {
        assert_eq!(round_trip(std::slice::from_ref(&outer), &options), vec![outer.clone()]);
    }
}

#[test]
fn test_inflate_limit_is_a_capacity_error() {
    let big = Array::double("zeros", &[100, 100], vec![0.0; 10_000]).unwrap();
    let bytes = write_all([&big], &WriteOptions::default()).unwrap();
    let options = ReadOptions::default().with_inflate_limit(1024);
    let err = read_all(&bytes, &options).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Capacity);
    assert!(read_all(&bytes, &ReadOptions::default()).is_ok());
}

#[test]
fn test_custom_description_and_big_endian_header() {
    let options = WriteOptions::default()
        .with_description("made for a test")
        .with_byte_order(ByteOrder::Big);
    let bytes = write_all([&Array::scalar("x", 2.0)], &options).unwrap();
    assert_eq!(&bytes[126..128], b"MI");
    let header = parse_header(&bytes).unwrap();
    assert_eq!(header.description_str(), "MATLAB 5.0 MAT-file, made for a test");
    assert_eq!(header.byte_order, ByteOrder::Big);
}

#[test]
fn test_sparse_nzmax_is_kept() {
    let mut sparse = SparseArray::new("sp", 4, 4).with_nzmax(10);
    sparse.set(2, 2, 1.0).unwrap();
    let back = round_trip(&[Array::from(sparse)], &WriteOptions::default());
    assert_eq!(back[0].as_sparse().unwrap().nzmax(), 10);
}

#[test]
fn test_cell_addressed_by_coordinates() {
    let mut cell = CellArray::new("c", &[2, 2]);
    cell.set_at(1, 0, Array::scalar("", 5.0)).unwrap();
    let back = round_trip(&[Array::from(cell)], &WriteOptions::default());
    let cell = back[0].as_cell().unwrap();
    assert_eq!(cell.get_at(1, 0).unwrap().get_f64(0, 0).unwrap(), 5.0);
    assert!(cell.get_at(0, 1).unwrap().is_empty());
    assert!(cell.get_at(2, 0).is_err());
}
