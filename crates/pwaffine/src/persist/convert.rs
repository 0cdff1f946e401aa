//! Conversion between runtime types and schema types.
//!
//! Runtime → schema conversions are `From` impls and cannot fail.
//! Schema → runtime conversions are `TryFrom` impls that reject models
//! which would evaluate incorrectly: coefficient vectors of the wrong
//! length, a scale vector that disagrees with the regions, non-finite
//! values, or metadata that contradicts the regions.

use ndarray::Array2;

use super::error::ReadError;
use super::schema::{
    AffineFunctionSchema, GuardPredicateSchema, ModelMetaSchema, ModelSchema,
    NaiveBayesClassSchema, NaiveBayesSchema, OrClauseSchema, RegionSchema,
};
use crate::baseline::GaussianNaiveBayes;
use crate::model::{ModelMeta, PwaModel};
use crate::repr::{AffineFunction, GuardPredicate, OrClause, PiecewiseModel, Predicate, Region};

fn invalid(msg: impl Into<String>) -> ReadError {
    ReadError::Validation(msg.into())
}

// =============================================================================
// Representation -> schema
// =============================================================================

impl From<&AffineFunction> for AffineFunctionSchema {
    fn from(f: &AffineFunction) -> Self {
        Self { coeff: f.coefficients().to_vec() }
    }
}

impl From<&OrClause> for OrClauseSchema {
    fn from(clause: &OrClause) -> Self {
        Self { terms: clause.terms().iter().map(|p| p.function().into()).collect() }
    }
}

impl From<&GuardPredicate> for GuardPredicateSchema {
    fn from(guard: &GuardPredicate) -> Self {
        Self { clauses: guard.clauses().iter().map(OrClauseSchema::from).collect() }
    }
}

impl From<&Region> for RegionSchema {
    fn from(region: &Region) -> Self {
        Self { f: (&region.function).into(), g: (&region.guard).into() }
    }
}

impl From<&PiecewiseModel> for ModelSchema {
    fn from(model: &PiecewiseModel) -> Self {
        Self {
            regions: model.regions().iter().map(RegionSchema::from).collect(),
            scale: model.scale().to_vec(),
            meta: None,
        }
    }
}

// =============================================================================
// Schema -> representation
// =============================================================================

/// Feature count implied by a model file, after checking that every part
/// agrees on it.
fn model_dims(schema: &ModelSchema) -> Result<usize, ReadError> {
    let dims = match schema.regions.first() {
        Some(region) => match region.f.coeff.len() {
            0 => return Err(invalid("region 0: function has no coefficients")),
            len => len - 1,
        },
        None if !schema.scale.is_empty() => schema.scale.len(),
        None => schema.meta.as_ref().map_or(0, |m| m.num_features),
    };

    if !schema.scale.is_empty() && schema.scale.len() != dims {
        return Err(invalid(format!(
            "scale has {} entries but the model has {dims} features",
            schema.scale.len()
        )));
    }
    if let Some(v) = schema.scale.iter().find(|v| !v.is_finite()) {
        return Err(invalid(format!("non-finite scale entry {v}")));
    }
    if let Some(meta) = &schema.meta {
        if meta.num_features != dims {
            return Err(invalid(format!(
                "meta.num_features is {} but the model has {dims} features",
                meta.num_features
            )));
        }
    }
    Ok(dims)
}

fn affine_function(
    schema: AffineFunctionSchema,
    dims: usize,
    at: impl FnOnce() -> String,
) -> Result<AffineFunction, ReadError> {
    if schema.coeff.len() != dims + 1 {
        return Err(invalid(format!(
            "{}: expected {} coefficients, found {}",
            at(),
            dims + 1,
            schema.coeff.len()
        )));
    }
    if let Some(v) = schema.coeff.iter().find(|v| !v.is_finite()) {
        return Err(invalid(format!("{}: non-finite coefficient {v}", at())));
    }
    Ok(AffineFunction::new(schema.coeff))
}

fn region(schema: RegionSchema, index: usize, dims: usize) -> Result<Region, ReadError> {
    let function = affine_function(schema.f, dims, || format!("region {index} function"))?;
    let clauses = schema
        .g
        .clauses
        .into_iter()
        .enumerate()
        .map(|(c, clause)| -> Result<OrClause, ReadError> {
            let terms = clause
                .terms
                .into_iter()
                .enumerate()
                .map(|(t, term)| {
                    affine_function(term, dims, || format!("region {index} clause {c} term {t}"))
                        .map(Predicate::new)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(OrClause::new(terms))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Region::new(function, GuardPredicate::new(clauses)))
}

impl TryFrom<ModelSchema> for PiecewiseModel {
    type Error = ReadError;

    fn try_from(schema: ModelSchema) -> Result<Self, Self::Error> {
        let dims = model_dims(&schema)?;
        let regions = schema
            .regions
            .into_iter()
            .enumerate()
            .map(|(i, r)| region(r, i, dims))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PiecewiseModel::new(regions, schema.scale))
    }
}

// =============================================================================
// ModelMeta / PwaModel conversions
// =============================================================================

impl From<&ModelMeta> for ModelMetaSchema {
    fn from(meta: &ModelMeta) -> Self {
        Self {
            num_features: meta.n_features,
            threshold: meta.threshold,
            num_samples: meta.n_samples,
            num_functions: meta.n_functions,
            feature_names: meta.feature_names.clone(),
        }
    }
}

impl From<ModelMetaSchema> for ModelMeta {
    fn from(schema: ModelMetaSchema) -> Self {
        Self {
            n_features: schema.num_features,
            threshold: schema.threshold,
            n_samples: schema.num_samples,
            n_functions: schema.num_functions,
            feature_names: schema.feature_names,
        }
    }
}

impl From<&PwaModel> for ModelSchema {
    fn from(model: &PwaModel) -> Self {
        Self { meta: Some(model.meta().into()), ..ModelSchema::from(model.model()) }
    }
}

impl TryFrom<ModelSchema> for PwaModel {
    type Error = ReadError;

    fn try_from(mut schema: ModelSchema) -> Result<Self, Self::Error> {
        let dims = model_dims(&schema)?;
        let meta = schema.meta.take();
        if let Some(names) = meta.as_ref().and_then(|m| m.feature_names.as_ref()) {
            if names.len() != dims {
                return Err(invalid(format!("{} feature names for {dims} features", names.len())));
            }
        }
        let model = PiecewiseModel::try_from(schema)?;
        let meta = meta.map_or_else(|| ModelMeta::new(dims), ModelMeta::from);
        Ok(PwaModel::from_model(model, meta))
    }
}

// =============================================================================
// Naive Bayes conversions
// =============================================================================

impl From<&GaussianNaiveBayes> for NaiveBayesSchema {
    fn from(nb: &GaussianNaiveBayes) -> Self {
        let classes = nb
            .classes()
            .iter()
            .enumerate()
            .map(|(c, &label)| NaiveBayesClassSchema {
                label,
                prior: nb.priors()[c],
                mean: nb.means().row(c).to_vec(),
                var: nb.variances().row(c).to_vec(),
            })
            .collect();
        Self { num_features: nb.n_features(), classes }
    }
}

impl TryFrom<NaiveBayesSchema> for GaussianNaiveBayes {
    type Error = ReadError;

    fn try_from(schema: NaiveBayesSchema) -> Result<Self, Self::Error> {
        let n_features = schema.num_features;
        let n_classes = schema.classes.len();
        if n_classes == 0 {
            return Err(invalid("naive bayes model has no classes"));
        }

        let mut classes = Vec::with_capacity(n_classes);
        let mut priors = Vec::with_capacity(n_classes);
        let mut means = Array2::<f64>::zeros((n_classes, n_features));
        let mut variances = Array2::<f64>::zeros((n_classes, n_features));
        for (c, class) in schema.classes.into_iter().enumerate() {
            if class.mean.len() != n_features || class.var.len() != n_features {
                return Err(invalid(format!(
                    "class {c}: expected {n_features} means and variances, found {} and {}",
                    class.mean.len(),
                    class.var.len()
                )));
            }
            if !(class.prior > 0.0 && class.prior <= 1.0) {
                return Err(invalid(format!("class {c}: prior {} outside (0, 1]", class.prior)));
            }
            if !class.label.is_finite() || class.mean.iter().any(|m| !m.is_finite()) {
                return Err(invalid(format!("class {c}: non-finite label or mean")));
            }
            if let Some(v) = class.var.iter().find(|&&v| !(v.is_finite() && v > 0.0)) {
                return Err(invalid(format!("class {c}: variance {v} must be finite and positive")));
            }
            if classes.last().is_some_and(|&prev: &f32| prev >= class.label) {
                return Err(invalid(format!("class {c}: labels must be strictly ascending")));
            }
            for i in 0..n_features {
                means[[c, i]] = class.mean[i];
                variances[[c, i]] = class.var[i];
            }
            classes.push(class.label);
            priors.push(class.prior);
        }
        Ok(GaussianNaiveBayes::from_parts(classes, priors, means, variances))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;

    fn sample_model() -> PiecewiseModel {
        let guard = GuardPredicate::new(vec![OrClause::new(vec![
            Predicate::at_most(2, 0, 0.5),
            Predicate::at_least(2, 1, 1.5),
        ])]);
        PiecewiseModel::new(
            vec![
                Region::new(AffineFunction::new(vec![1.0, -2.0, 0.25]), guard),
                Region::catch_all(AffineFunction::constant(2, 3.0)),
            ],
            vec![0.1, 10.0],
        )
    }

    #[test]
    fn piecewise_roundtrip() {
        let model = sample_model();
        let schema = ModelSchema::from(&model);
        assert_eq!(schema.regions.len(), 2);
        assert_eq!(schema.regions[1].g.clauses.len(), 1);
        let restored = PiecewiseModel::try_from(schema).unwrap();
        assert_eq!(restored, model);
    }

    #[test]
    fn guard_without_clauses_never_matches() {
        let mut schema = ModelSchema::from(&sample_model());
        schema.regions[0].g.clauses.clear();
        let restored = PiecewiseModel::try_from(schema).unwrap();

        for x in [[0.0, 0.0], [1.0, 2.0], [-5.0, 7.5], [40.0, 0.5]] {
            assert_eq!(restored.region_index(&x), Some(1));
            assert_eq!(restored.evaluate(&x), 3.0);
        }
    }

    #[test]
    fn pwa_model_roundtrip_keeps_meta() {
        let meta = ModelMeta::new(2).with_threshold(0.1).with_n_samples(40);
        let model = PwaModel::from_model(sample_model(), meta.clone());
        let schema = ModelSchema::from(&model);
        assert_eq!(schema.meta.as_ref().unwrap().num_features, 2);
        let restored = PwaModel::try_from(schema).unwrap();
        assert_eq!(restored.meta(), &meta);
        assert_eq!(restored.model(), model.model());
    }

    #[test]
    fn missing_meta_is_derived() {
        let schema = ModelSchema::from(&sample_model());
        let restored = PwaModel::try_from(schema).unwrap();
        assert_eq!(restored.meta(), &ModelMeta::new(2));
    }

    #[test]
    fn rejects_scale_mismatch() {
        let mut schema = ModelSchema::from(&sample_model());
        schema.scale.push(1.0);
        assert!(matches!(PiecewiseModel::try_from(schema), Err(ReadError::Validation(_))));
    }

    #[test]
    fn rejects_short_guard_term() {
        let mut schema = ModelSchema::from(&sample_model());
        schema.regions[0].g.clauses[0].terms[1].coeff.pop();
        let err = PiecewiseModel::try_from(schema).unwrap_err();
        assert!(err.to_string().contains("region 0 clause 0 term 1"), "{err}");
    }

    #[test]
    fn rejects_meta_mismatch() {
        let mut schema = ModelSchema::from(&sample_model());
        schema.meta = Some(ModelMetaSchema {
            num_features: 5,
            threshold: None,
            num_samples: None,
            num_functions: None,
            feature_names: None,
        });
        assert!(matches!(PwaModel::try_from(schema), Err(ReadError::Validation(_))));
    }

    #[test]
    fn empty_model_is_valid() {
        let schema = ModelSchema { regions: vec![], scale: vec![], meta: None };
        let model = PiecewiseModel::try_from(schema).unwrap();
        assert_eq!(model.n_regions(), 0);
    }

    #[test]
    fn naive_bayes_roundtrip() {
        let data = Dataset::from_rows([(vec![0.0], -1.0), (vec![1.0], -1.0), (vec![5.0], 1.0)]).unwrap();
        let nb = GaussianNaiveBayes::fit(&data).unwrap();
        let schema = NaiveBayesSchema::from(&nb);
        assert_eq!(schema.classes.len(), 2);
        assert_eq!(GaussianNaiveBayes::try_from(schema).unwrap(), nb);
    }

    #[test]
    fn naive_bayes_rejects_bad_variance() {
        let data = Dataset::from_rows([(vec![0.0], -1.0), (vec![1.0], 1.0)]).unwrap();
        let mut schema = NaiveBayesSchema::from(&GaussianNaiveBayes::fit(&data).unwrap());
        schema.classes[0].var[0] = 0.0;
        assert!(matches!(GaussianNaiveBayes::try_from(schema), Err(ReadError::Validation(_))));
    }
}
