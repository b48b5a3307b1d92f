//! Static page chrome wrapped around the rendered board blocks.

use crate::domain::RenderedBlock;

/// Document head with the board styles; `cell_size` is the cell edge in pixels.
pub fn page_header(cell_size: u32) -> String {
    format!(
        r#"
  <html>
  <head>
  <style>
    .board {{
      border-collapse: collapse;
    }}
    .border {{
      border: 1px solid black;
    }}
    .cell {{
      width: {cell_size}px;
      height: {cell_size}px;
    }}
  </style>
  </head>
  <body>"#
    )
}

pub fn page_footer() -> &'static str {
    r#"
  </body>
  </html>
  "#
}

/// Complete HTML document: header, one line per block, footer.
pub fn assemble_page(blocks: &[RenderedBlock], cell_size: u32) -> String {
    let mut page = page_header(cell_size);
    page.push('\n');
    for block in blocks {
        page.push_str(&block.html);
        page.push('\n');
    }
    page.push_str(page_footer());
    page.push('\n');
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_blocks_when_assembling_then_wraps_in_document() {
        let blocks = vec![
            RenderedBlock {
                path: vec![],
                html: "<p>a</p>".to_string(),
            },
            RenderedBlock {
                path: vec![4],
                html: "<p>b</p>".to_string(),
            },
        ];

        let page = assemble_page(&blocks, 48);

        assert!(page.contains("width: 48px;"));
        let body_start = page.find("<body>").unwrap();
        let a = page.find("<p>a</p>").unwrap();
        let b = page.find("<p>b</p>").unwrap();
        let body_end = page.find("</body>").unwrap();
        assert!(body_start < a && a < b && b < body_end);
        assert!(page.trim_end().ends_with("</html>"));
    }
}
