use super::{parse_details, parse_frame_rate, MediaDetails, ProbeOutput, VideoDetails};

fn probe_fixture(case: &str) -> MediaDetails {
    let input = std::fs::read_to_string(format!("./src/ffmpeg/ffprobe_7_0_{case}.json"))
        .expect("Read file");

    let output: ProbeOutput = serde_json::from_str(&input).expect("Valid json");

    parse_details(output)
}

#[test]
fn parses_mp4_with_video_stream() {
    let details = probe_fixture("mp4_h264");

    assert_eq!(
        details,
        MediaDetails {
            duration: Some(30.526667),
            size: Some(1055736),
            format: Some("mov,mp4,m4a,3gp,3g2,mj2".to_string()),
            bitrate: Some(276707),
            video: Some(VideoDetails {
                codec: Some("h264".to_string()),
                width: Some(1280),
                height: Some(720),
                framerate: Some(30000.0 / 1001.0),
            }),
        }
    );
}

#[test]
fn audio_only_input_has_no_video_details() {
    let details = probe_fixture("mp3_audio_only");

    assert_eq!(details.video, None);
    assert_eq!(details.format.as_deref(), Some("mp3"));
    assert_eq!(details.duration, Some(45.061224));
    assert_eq!(details.size, Some(721052));
    assert_eq!(details.bitrate, Some(128014));
}

#[test]
fn selects_the_video_stream_by_codec_type() {
    let details = probe_fixture("webm_vp9");

    let video = details.video.expect("Has video stream");

    assert_eq!(video.codec.as_deref(), Some("vp9"));
    assert_eq!(video.width, Some(640));
    assert_eq!(video.height, Some(360));
    assert_eq!(video.framerate, Some(30.0));
}

#[test]
fn parses_rational_frame_rates() {
    assert_eq!(parse_frame_rate("30/1"), Some(30.0));
    assert_eq!(parse_frame_rate("30000/1001"), Some(30000.0 / 1001.0));
}

#[test]
fn parses_plain_frame_rates() {
    assert_eq!(parse_frame_rate("25"), Some(25.0));
    assert_eq!(parse_frame_rate("29.97"), Some(29.97));
}

#[test]
fn rejects_degenerate_frame_rates() {
    assert_eq!(parse_frame_rate("0/0"), None);
    assert_eq!(parse_frame_rate("abc"), None);
    assert_eq!(parse_frame_rate(""), None);
}
