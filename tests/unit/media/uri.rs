use super::*;

fn base(raw: &str) -> Option<String> {
    MediaUri::parse(raw).unwrap().base_reference()
}

#[test]
fn http_base_is_scheme_and_authority() {
    assert_eq!(
        base("http://192.168.1.5:8081/assets/logo1.mp4").as_deref(),
        Some("http://192.168.1.5:8081")
    );
    assert_eq!(
        base("https://cdn.example.com/a/b/c.mp4?v=2").as_deref(),
        Some("https://cdn.example.com")
    );
    assert_eq!(base("http://host:8081").as_deref(), Some("http://host:8081"));
    assert_eq!(base("http://host?x=1").as_deref(), Some("http://host"));
}

#[test]
fn file_base_is_containing_directory() {
    assert_eq!(
        base("file:///var/app/bundle/logo1.mp4").as_deref(),
        Some("file:///var/app/bundle/")
    );
    assert_eq!(base("/tmp/clip.mp4").as_deref(), Some("/tmp/"));
    assert_eq!(
        base("asset://bundle/video/logo1.mp4").as_deref(),
        Some("asset://bundle/video/")
    );
}

#[test]
fn no_base_without_a_slash() {
    assert_eq!(base("clip.mp4"), None);
    assert_eq!(base("http:nohost"), None);
    assert_eq!(base("http:///path"), None);
}

#[test]
fn classifies_schemes() {
    assert_eq!(MediaUri::parse("HTTPS://x/y").unwrap().kind(), UriKind::Http);
    assert_eq!(MediaUri::parse("file:///x").unwrap().kind(), UriKind::File);
    assert_eq!(MediaUri::parse("/x/y.mp4").unwrap().kind(), UriKind::File);
    assert_eq!(MediaUri::parse("C:/x/y.mp4").unwrap().kind(), UriKind::File);
    assert_eq!(MediaUri::parse("asset:/y.mp4").unwrap().kind(), UriKind::App);
    assert!(MediaUri::parse("  ").is_err());
}

#[test]
fn local_paths() {
    let p = |s: &str| MediaUri::parse(s).unwrap().local_path();
    assert_eq!(p("file:///tmp/a.mp4"), Some(PathBuf::from("/tmp/a.mp4")));
    assert_eq!(
        p("file://localhost/tmp/a.mp4"),
        Some(PathBuf::from("/tmp/a.mp4"))
    );
    assert_eq!(p("frames/"), Some(PathBuf::from("frames/")));
    assert_eq!(p("http://h/a.mp4"), None);
}

#[test]
fn display_round_trips_raw_text() {
    let raw = "http://h:1/a b.mp4";
    assert_eq!(MediaUri::parse(raw).unwrap().to_string(), raw);
}
