//! 上传附件的内容类型校验

const ZIP: &[u8] = &[0x50, 0x4B, 0x03, 0x04];
const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// 文件首个分块的魔术字节是否与扩展名（含点号，如 ".png"）一致
///
/// 文本类附件不检查签名，只拒绝包含 NUL 字节的内容；未知扩展名一律拒绝。
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    if data.is_empty() {
        return false;
    }

    match extension.to_lowercase().as_str() {
        ".png" => data.starts_with(PNG),
        ".jpg" | ".jpeg" => data.starts_with(&[0xFF, 0xD8, 0xFF]),
        ".gif" => data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"),
        ".webp" => data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP",
        ".pdf" => data.starts_with(b"%PDF"),
        // OOXML 文档本质是 zip
        ".zip" | ".docx" | ".pptx" | ".xlsx" => data.starts_with(ZIP),
        ".mp4" | ".mov" => data.len() >= 8 && &data[4..8] == b"ftyp",
        ".txt" | ".md" | ".csv" | ".json" => !data.contains(&0),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_signatures() {
        assert!(validate_magic_bytes(PNG, ".PNG"));
        assert!(!validate_magic_bytes(PNG, ".jpg"));
        assert!(validate_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0], ".jpeg"));
        assert!(validate_magic_bytes(b"RIFF\x00\x00\x00\x00WEBPVP8 ", ".webp"));
    }

    #[test]
    fn test_pitch_deck_formats() {
        assert!(validate_magic_bytes(b"%PDF-1.7", ".pdf"));
        assert!(validate_magic_bytes(ZIP, ".pptx"));
        assert!(!validate_magic_bytes(b"%PDF-1.7", ".pptx"));
    }

    #[test]
    fn test_demo_video() {
        assert!(validate_magic_bytes(b"\x00\x00\x00\x18ftypmp42", ".mp4"));
        assert!(!validate_magic_bytes(b"\x00\x00\x00\x18moov", ".mp4"));
    }

    #[test]
    fn test_text_rejects_binary() {
        assert!(validate_magic_bytes(b"# README", ".md"));
        assert!(!validate_magic_bytes(b"MZ\x00\x90", ".txt"));
    }

    #[test]
    fn test_empty_or_unknown() {
        assert!(!validate_magic_bytes(&[], ".png"));
        assert!(!validate_magic_bytes(b"MZ", ".exe"));
    }
}
