use crate::io::file::create_file;
use crate::io::fs::read_file_to_string;
use crate::make_error;
use crate::tree::tree::{NodeId, Tree};
use crate::utils::float_fmt::float_to_digits;
use bio::io::newick;
use eyre::{Report, WrapErr};
use itertools::Itertools;
use log::warn;
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use smart_default::SmartDefault;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::Path;

pub fn read_nwk_file(nwk_file_path: impl AsRef<Path>) -> Result<Tree, Report> {
  let nwk_file_path = nwk_file_path.as_ref();
  let nwk_str = read_file_to_string(nwk_file_path)?;
  read_nwk_str(&nwk_str).wrap_err_with(|| format!("When parsing Newick file {nwk_file_path:#?}"))
}

/// Reads a file with any number of `;`-terminated Newick trees.
pub fn read_nwk_file_many(nwk_file_path: impl AsRef<Path>) -> Result<Vec<Tree>, Report> {
  let nwk_file_path = nwk_file_path.as_ref();
  let nwk_str = read_file_to_string(nwk_file_path)?;
  nwk_str
    .split_inclusive(';')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .enumerate()
    .map(|(i, s)| {
      read_nwk_str(s).wrap_err_with(|| format!("When parsing tree #{} of Newick file {nwk_file_path:#?}", i + 1))
    })
    .collect()
}

pub fn read_nwk_str(nwk_str: &str) -> Result<Tree, Report> {
  let nwk_tree = newick::read(nwk_str.trim().as_bytes())?;
  let g = &nwk_tree.g;

  let roots = g
    .node_indices()
    .filter(|&i| g.neighbors_directed(i, Direction::Incoming).next().is_none())
    .collect_vec();
  let root = match roots.as_slice() {
    [root] => *root,
    [] => return make_error!("When reading Newick: no root node found"),
    _ => return make_error!("When reading Newick: found {} root nodes, but only one is allowed", roots.len()),
  };

  let node_name = |i: NodeIndex| {
    let name = g[i].trim();
    if name == "N/A" {
      String::new()
    } else {
      name.to_owned()
    }
  };

  let mut tree = Tree::new(node_name(root));
  let mut ids: HashMap<NodeIndex, NodeId> = HashMap::from([(root, tree.root())]);
  for i in g.node_indices().filter(|&i| i != root) {
    ids.insert(i, tree.add_node(node_name(i), 0.0));
  }

  // Raw edges keep the order in which the children were written
  for edge in g.raw_edges() {
    let parent = ids[&edge.source()];
    let child = ids[&edge.target()];
    tree.attach(parent, child)?;
    let dist = f64::from(edge.weight);
    tree.set_dist(child, if dist.is_finite() { dist } else { 0.0 });
  }

  assign_node_names(&mut tree);
  check_unique_names(&tree)?;
  Ok(tree)
}

/// Gives a generated unique name to every unnamed node.
pub fn assign_node_names(tree: &mut Tree) {
  let unnamed = tree.node_ids().filter(|&id| tree.name(id).is_empty()).collect_vec();
  for id in unnamed {
    let name = tree.new_name();
    tree.node_mut(id).name = name;
  }
}

fn check_unique_names(tree: &Tree) -> Result<(), Report> {
  let mut seen = HashSet::with_capacity(tree.num_nodes());
  for id in tree.node_ids() {
    if !seen.insert(tree.name(id)) {
      return make_error!("Tree contains more than one node named '{}'", tree.name(id));
    }
  }
  Ok(())
}

#[derive(Clone, Debug, SmartDefault)]
pub struct WriteNwkOptions {
  /// Format branch lengths keeping this many significant digits
  #[default(Some(6))]
  pub weight_significant_digits: Option<u8>,

  /// Format branch lengths keeping this many decimal digits
  pub weight_decimal_digits: Option<i8>,

  /// Write names of internal nodes, not only of leaves
  #[default(true)]
  pub internal_names: bool,
}

pub fn write_nwk_file(filepath: impl AsRef<Path>, tree: &Tree, options: &WriteNwkOptions) -> Result<(), Report> {
  let filepath = filepath.as_ref();
  let mut f = create_file(filepath)?;
  write_nwk_writer(&mut f, tree, options)?;
  writeln!(f)?;
  Ok(())
}

pub fn write_nwk_str(tree: &Tree, options: &WriteNwkOptions) -> Result<String, Report> {
  let mut buf = Vec::new();
  write_nwk_writer(&mut buf, tree, options)?;
  Ok(String::from_utf8(buf)?)
}

pub fn write_nwk_writer(writer: &mut impl Write, tree: &Tree, options: &WriteNwkOptions) -> Result<(), Report> {
  let mut stack: Vec<(NodeId, usize)> = vec![(tree.root(), 0)];
  while let Some((node, child_visit)) = stack.pop() {
    let children = tree.children(node);

    if child_visit < children.len() {
      stack.push((node, child_visit + 1));

      if child_visit == 0 {
        write!(writer, "(")?;
      } else {
        write!(writer, ",")?;
      }

      stack.push((children[child_visit], 0));
    } else {
      if child_visit > 0 {
        write!(writer, ")")?;
      }

      if tree.is_leaf(node) || options.internal_names {
        write!(writer, "{}", tree.name(node))?;
      }

      if !tree.is_root(node) {
        write!(writer, ":{}", format_weight(tree.dist(node), options))?;
      }
    }
  }

  write!(writer, ";")?;

  Ok(())
}

pub fn format_weight(weight: f64, options: &WriteNwkOptions) -> String {
  if !weight.is_finite() {
    warn!("When converting tree to Newick: branch length is invalid: '{weight}'");
  }
  float_to_digits(
    weight,
    options.weight_significant_digits.or(Some(6)),
    options.weight_decimal_digits,
  )
}
