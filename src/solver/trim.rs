// vim: set ai et ts=4 sw=4 sts=4:
use crate::error::Error;
use crate::grid::Cell;

/// The boundary segments stripped off by `trim`, kept so the solver's
/// output can be spliced back into the full line. Restoring reattaches the
/// segments only; the edge-hint adjustment is never undone.
#[derive(PartialEq, Debug, Clone)]
pub struct TrimInfo {
    left:  Vec<Cell>,
    right: Vec<Cell>,
}

/// Strips already-determined boundary cells from a line and shrinks the
/// edge hints accordingly, producing a smaller subproblem.
///
/// A Filled run that ends exactly where the remaining Unknown region begins
/// is "on the rim": it can only belong to that edge's hint, so the hint is
/// decremented by the run length. A hint driven to exactly zero is collapsed
/// to a 1-length placeholder and the trim boundary is pulled back one cell.
/// Runs that lie fully inside the determined zone consume their edge hint
/// outright. Mirrored from the right edge.
///
/// Fails with a Contradiction if a hint would go negative, or if the line
/// has no Unknown cell left (trimming a solved line is a caller error).
pub fn trim(line: &[Cell], hints: &[usize])
    -> Result<(Vec<Cell>, Vec<usize>, TrimInfo), Error>
{
    let mut min_index = line.iter().position(|&c| c == Cell::Unknown)
        .ok_or_else(|| Error::contradiction("cannot trim a line without unknown cells"))?;
    if min_index > 0 && line[min_index-1] == Cell::Filled {
        min_index -= 1;
    }
    let mut hints = hints.to_vec();

    let mut i = 0;
    while i < min_index {
        if line[i] == Cell::Filled {
            let start = i;
            while i < min_index && line[i] == Cell::Filled {
                i += 1;
            }
            if i == min_index {
                // on the rim
                let first = hints.first_mut()
                    .ok_or_else(|| impossible(line, "no hint left for rim run"))?;
                *first = first.checked_sub(i - start)
                    .ok_or_else(|| impossible(line, "leading hint went negative"))?;
                if *first == 0 {
                    *first = 1;
                    min_index -= 1;
                    break;
                }
            } else {
                if hints.is_empty() {
                    return Err(impossible(line, "determined run without a hint"));
                }
                hints.remove(0);
            }
        }
        i += 1;
    }

    let mut max_index = line.iter().rposition(|&c| c == Cell::Unknown)
        .ok_or_else(|| Error::contradiction("cannot trim a line without unknown cells"))?;
    if max_index + 1 < line.len() && line[max_index+1] == Cell::Filled {
        max_index += 1;
    }

    let mut i = line.len() - 1;
    while i > max_index {
        if line[i] == Cell::Filled {
            let start = i;
            while i > max_index && line[i] == Cell::Filled {
                i -= 1;
            }
            if i == max_index {
                // on the rim
                let last = hints.last_mut()
                    .ok_or_else(|| impossible(line, "no hint left for rim run"))?;
                *last = last.checked_sub(start - i)
                    .ok_or_else(|| impossible(line, "trailing hint went negative"))?;
                if *last == 0 {
                    *last = 1;
                    max_index += 1;
                }
                break;
            } else {
                if hints.pop().is_none() {
                    return Err(impossible(line, "determined run without a hint"));
                }
                i -= 1;
            }
        } else {
            i -= 1;
        }
    }

    let info = TrimInfo {
        left:  line[..min_index].to_vec(),
        right: line[max_index+1..].to_vec(),
    };
    Ok((line[min_index..=max_index].to_vec(), hints, info))
}

/// Reattaches the untouched boundary segments around a solver's output.
pub fn restore(line: &[Cell], info: &TrimInfo) -> Vec<Cell> {
    let mut result = info.left.clone();
    result.extend_from_slice(line);
    result.extend_from_slice(&info.right);
    result
}

fn impossible(line: &[Cell], what: &str) -> Error {
    let encoded: Vec<i8> = line.iter().map(|&c| c.to_i8()).collect();
    Error::contradiction(format!("impossible line {:?}: {}", encoded, what))
}
