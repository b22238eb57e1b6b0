mod pdf;

pub use pdf::HttpPdfLoader;
