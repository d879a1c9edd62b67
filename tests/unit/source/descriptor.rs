use std::io::{Cursor, Read};

use super::*;

#[test]
fn asset_path_gets_gif_extension() {
    assert_eq!(normalize_asset_path("dir/name").unwrap(), "dir/name.gif");
    assert_eq!(normalize_asset_path("dir/name.gif").unwrap(), "dir/name.gif");
}

#[test]
fn asset_path_normalizes_separators() {
    assert_eq!(normalize_asset_path("dir\\sub\\name").unwrap(), "dir/sub/name.gif");
    assert_eq!(normalize_asset_path("./dir//name").unwrap(), "dir/name.gif");
}

#[test]
fn asset_path_rejects_escapes() {
    assert!(normalize_asset_path("../x").is_err());
    assert!(normalize_asset_path("/abs/x").is_err());
    assert!(normalize_asset_path("").is_err());
    assert!(normalize_asset_path("./").is_err());
}

#[test]
fn parse_builtin_prefixes() {
    let SourceDescriptor::Asset(path) = SourceDescriptor::parse("asset:dir/name").unwrap() else {
        panic!("expected asset descriptor");
    };
    assert_eq!(path, "dir/name.gif");

    let SourceDescriptor::Url(url) =
        SourceDescriptor::parse("url:https://example.com/a.gif").unwrap()
    else {
        panic!("expected url descriptor");
    };
    assert_eq!(url, "https://example.com/a.gif");
}

#[test]
fn parse_rejects_unknown_and_empty() {
    assert!(matches!(
        SourceDescriptor::parse("ftp://x"),
        Err(GifViewError::InvalidSource(_))
    ));
    assert!(matches!(
        SourceDescriptor::parse("url:"),
        Err(GifViewError::InvalidSource(_))
    ));
    assert!(matches!(
        SourceDescriptor::parse("asset:"),
        Err(GifViewError::InvalidSource(_))
    ));
}

#[test]
fn registry_checks_registered_prefixes_in_order() {
    let mut reg = SourceRegistry::new();
    reg.register("mem:", |body| {
        Ok(Box::new(Cursor::new(format!("first:{body}").into_bytes())) as ByteStream)
    })
    .unwrap();
    reg.register("mem:x", |_| {
        Ok(Box::new(Cursor::new(b"second".to_vec())) as ByteStream)
    })
    .unwrap();

    let desc = reg.parse("mem:xyz").unwrap();
    let SourceDescriptor::Registered { prefix, body, open } = desc else {
        panic!("expected registered descriptor");
    };
    assert_eq!(prefix, "mem:");
    assert_eq!(body, "xyz");

    let mut out = String::new();
    open(&body).unwrap().read_to_string(&mut out).unwrap();
    assert_eq!(out, "first:xyz");

    let prefixes: Vec<&str> = reg.prefixes().collect();
    assert_eq!(prefixes, vec!["url:", "asset:", "mem:", "mem:x"]);
}

#[test]
fn registry_rejects_builtin_and_empty_prefixes() {
    let mut reg = SourceRegistry::new();
    let open = |_: &str| -> GifViewResult<ByteStream> { Ok(Box::new(std::io::empty())) };
    assert!(reg.register("", open).is_err());
    assert!(reg.register("url:special", open).is_err());
    assert!(reg.register("asset:", open).is_err());
}

#[test]
fn labels_describe_source() {
    assert_eq!(
        SourceDescriptor::asset("a/b").unwrap().label(),
        "asset:a/b.gif"
    );
    assert_eq!(SourceDescriptor::bytes(std::io::empty()).label(), "stream");
}
