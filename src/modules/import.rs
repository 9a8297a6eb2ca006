use std::collections::HashSet;

use crate::models::BookRecord;
use crate::utils::CodeNormalizer;

const CODE_HEADERS: &[&str] = &["codigo", "code", "cod", "codigo do livro"];
const TITLE_HEADERS: &[&str] = &["titulo do livro", "titulo", "title"];
const AUTHOR_HEADERS: &[&str] = &["autor", "author"];
const QUANTITY_HEADERS: &[&str] = &["quantidade", "quantity", "copies", "qtd"];

/// Column positions resolved from the header row
#[derive(Debug)]
struct CatalogColumns {
    code: usize,
    title: usize,
    author: usize,
    quantity: Option<usize>,
}

impl CatalogColumns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, String> {
        // Headers are matched accent- and case-insensitively regardless of
        // the code normalization setting.
        let folder = CodeNormalizer::new(true);
        let folded: Vec<String> = headers.iter().map(|h| folder.fold_text(h)).collect();
        let find = |aliases: &[&str]| folded.iter().position(|h| aliases.contains(&h.as_str()));

        let code = find(CODE_HEADERS).ok_or("Missing code column (codigo)")?;
        let title = find(TITLE_HEADERS).ok_or("Missing title column (titulo)")?;
        let author = find(AUTHOR_HEADERS).ok_or("Missing author column (autor)")?;

        Ok(Self {
            code,
            title,
            author,
            quantity: find(QUANTITY_HEADERS),
        })
    }
}

/// Spreadsheet exports from pt-BR locales use `;` as separator.
fn sniff_delimiter(content: &[u8]) -> u8 {
    let first_line = content.split(|b| *b == b'\n').next().unwrap_or_default();
    let semicolons = first_line.iter().filter(|b| **b == b';').count();
    let commas = first_line.iter().filter(|b| **b == b',').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Missing, malformed or negative quantities count as a single copy.
fn parse_quantity(raw: Option<&str>) -> u32 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 1;
    };
    if let Ok(n) = raw.parse::<u32>() {
        return n;
    }
    // Spreadsheet exports often write integers as "2.0"
    match raw.replace(',', ".").parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => f as u32,
        _ => 1,
    }
}

pub fn parse_catalog_csv(
    content: &[u8],
    normalizer: &CodeNormalizer,
) -> Result<Vec<BookRecord>, String> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(sniff_delimiter(content))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content);

    let headers = rdr
        .headers()
        .map_err(|e| format!("CSV parse error: {}", e))?
        .clone();
    let columns = CatalogColumns::resolve(&headers)?;

    let mut seen = HashSet::new();
    let mut books = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| format!("CSV parse error: {}", e))?;

        let code = record.get(columns.code).unwrap_or_default().trim();
        if code.is_empty() {
            continue;
        }

        let key = normalizer.normalize(code);
        if !seen.insert(key.clone()) {
            tracing::warn!("Duplicate catalog code '{}' skipped", key);
            continue;
        }

        books.push(BookRecord {
            code: code.to_string(),
            title: record.get(columns.title).unwrap_or_default().trim().to_string(),
            author: record.get(columns.author).unwrap_or_default().trim().to_string(),
            total_copies: parse_quantity(columns.quantity.and_then(|i| record.get(i))),
        });
    }

    Ok(books)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_portuguese_headers() {
        let csv = "codigo,Título do Livro,Autor,quantidade\nB1,Dom Casmurro,Machado de Assis,2\n";
        let books = parse_catalog_csv(csv.as_bytes(), &CodeNormalizer::default()).unwrap();
        assert_eq!(
            books,
            vec![BookRecord::new("B1", "Dom Casmurro", "Machado de Assis", 2)]
        );
    }

    #[test]
    fn test_missing_quantity_column_defaults_to_one() {
        let csv = "code,title,author\nx9,Dune,Frank Herbert\n";
        let books = parse_catalog_csv(csv.as_bytes(), &CodeNormalizer::default()).unwrap();
        assert_eq!(books[0].total_copies, 1);
    }

    #[test]
    fn test_malformed_quantity_defaults_to_one() {
        let csv = "codigo;titulo;autor;quantidade\na1;A;X;abc\na2;B;Y;\na3;C;Z;3.0\na4;D;W;-2\n";
        let books = parse_catalog_csv(csv.as_bytes(), &CodeNormalizer::default()).unwrap();
        let copies: Vec<u32> = books.iter().map(|b| b.total_copies).collect();
        assert_eq!(copies, vec![1, 1, 3, 1]);
    }

    #[test]
    fn test_rows_without_code_are_excluded() {
        let csv = "codigo,titulo,autor\n,Orphan,Nobody\nb2,Kept,Someone\n";
        let books = parse_catalog_csv(csv.as_bytes(), &CodeNormalizer::default()).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].code, "b2");
    }

    #[test]
    fn test_duplicate_codes_keep_first_row() {
        let csv = "codigo,titulo,autor\nB1,First,A\n b1 ,Second,B\n";
        let books = parse_catalog_csv(csv.as_bytes(), &CodeNormalizer::default()).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "First");
    }

    #[test]
    fn test_missing_required_column_is_rejected() {
        let csv = "codigo,titulo\nb1,Only title\n";
        let err = parse_catalog_csv(csv.as_bytes(), &CodeNormalizer::default()).unwrap_err();
        assert!(err.contains("author"), "{}", err);
    }
}
