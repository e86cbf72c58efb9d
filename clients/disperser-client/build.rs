use std::{env, path::PathBuf};

fn main() {
    let project_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let proto_includes = project_dir.join("proto");

    let disperser_proto = project_dir.join("proto/disperser.proto");

    prost_build::compile_protos(&[disperser_proto], &[proto_includes]).unwrap();
}
