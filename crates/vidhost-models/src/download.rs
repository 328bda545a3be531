//! Public download URLs.

/// Public download host of the storage provider.
pub const DEFAULT_DOWNLOAD_HOST: &str = "https://f005.backblazeb2.com";

/// Build the public retrieval URL for an object in a bucket.
pub fn build_download_url(bucket_name: &str, stored_name: &str) -> String {
    build_download_url_with_host(DEFAULT_DOWNLOAD_HOST, bucket_name, stored_name)
}

/// Same as [`build_download_url`] with an explicit download host.
///
/// The stored name is percent-encoded as a single path segment.
pub fn build_download_url_with_host(host: &str, bucket_name: &str, stored_name: &str) -> String {
    format!(
        "{}/file/{}/{}",
        host.trim_end_matches('/'),
        bucket_name,
        urlencoding::encode(stored_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last_segment(url: &str) -> &str {
        url.rsplit('/').next().unwrap()
    }

    #[test]
    fn test_build_download_url_uses_fixed_pattern() {
        assert_eq!(
            build_download_url("webvid", "video_1000_clip.mp4"),
            "https://f005.backblazeb2.com/file/webvid/video_1000_clip.mp4"
        );
    }

    #[test]
    fn test_build_download_url_encodes_name() {
        let url = build_download_url("demo", "a b.mp4");
        assert_eq!(url, "https://f005.backblazeb2.com/file/demo/a%20b.mp4");
    }

    #[test]
    fn test_encoded_name_round_trips() {
        for name in ["a b.mp4", "a%20b.mp4", "dir/clip #1.mov", "ünïcødé.webm"] {
            let url = build_download_url("demo", name);
            let decoded = urlencoding::decode(last_segment(&url)).unwrap();
            assert_eq!(decoded, name);
        }
    }

    #[test]
    fn test_custom_host_trailing_slash() {
        assert_eq!(
            build_download_url_with_host("http://localhost:9000/", "b", "x.mp4"),
            "http://localhost:9000/file/b/x.mp4"
        );
    }
}
